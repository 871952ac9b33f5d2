#![allow(dead_code)]

/// Two newline-delimited status documents, cut at awkward places: inside a
/// key, inside an escape, between the halves of a surrogate pair and in the
/// middle of a multi-byte character.
pub const STREAM: [&str; 8] = [
    r#"{"id":1,"us"#,
    r#"er":{"name":"ad"#,
    r#"a","verified":tr"#,
    "ue},\"text\":\"caf\u{e9} \\u",
    r#"d83d\ude"#,
    "00\",\"geo\":null}\n[{\"id\":2,\"score\":-1.",
    "5e2,\"tags\":[\"x\",\"y\u{2603}",
    "\"]}]\n",
];

pub fn joined() -> String {
    STREAM.concat()
}

use rand::Rng;

pub const MIN_CODE_LEN: usize = 8;
pub const MAX_CODE_LEN: usize = 16;
pub const GENERATED_CODE_LEN: usize = 12;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Keeps `[A-Za-z0-9]` only, cuts to 16 characters and uppercases.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_CODE_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn is_acceptable_length(code: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
}

/// Source of fresh invite codes. Uniqueness is the caller's problem.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> String;
}

/// Draws codes from the thread-local CSPRNG (ChaCha, seeded from the OS).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&self) -> String {
        generate()
    }
}

/// 12 characters over `[A-Z0-9]`, each sampled uniformly (about 62 bits
/// per code, consuming well over 9 bytes of generator output).
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

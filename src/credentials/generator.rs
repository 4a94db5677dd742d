use rand::{rngs::OsRng, seq::SliceRandom, Rng};

pub const PASSWORD_LENGTH: usize = 12;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*";

/// Random 12-character password with at least one character of each class.
pub fn generate_password() -> String {
    generate_password_with(&mut OsRng)
}

fn generate_password_with<R: Rng>(rng: &mut R) -> String {
    let classes = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];
    let all: Vec<u8> = classes.concat();

    let mut buf: Vec<u8> = Vec::with_capacity(PASSWORD_LENGTH);
    for class in classes {
        buf.push(class[rng.gen_range(0..class.len())]);
    }
    while buf.len() < PASSWORD_LENGTH {
        buf.push(all[rng.gen_range(0..all.len())]);
    }
    buf.shuffle(rng);

    // every byte comes from the ASCII tables above
    buf.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn satisfies_policy(p: &str) -> bool {
        p.len() == PASSWORD_LENGTH
            && p.chars().any(|c| c.is_ascii_uppercase())
            && p.chars().any(|c| c.is_ascii_lowercase())
            && p.chars().any(|c| c.is_ascii_digit())
            && p.bytes().any(|b| SYMBOLS.contains(&b))
    }

    #[test]
    fn generated_passwords_satisfy_policy() {
        for _ in 0..500 {
            let p = generate_password();
            assert!(satisfies_policy(&p), "policy violated by {p}");
        }
    }

    #[test]
    fn only_uses_known_alphabet() {
        for _ in 0..200 {
            let p = generate_password();
            assert!(p
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || SYMBOLS.contains(&b)));
        }
    }

    #[test]
    fn guaranteed_characters_are_not_always_leading() {
        // without the shuffle the first char would always be uppercase
        let leading_upper = (0..200)
            .map(|_| generate_password())
            .filter(|p| p.starts_with(|c: char| c.is_ascii_uppercase()))
            .count();
        assert!(leading_upper < 200);
    }

    #[test]
    fn passwords_do_not_repeat() {
        let set: HashSet<String> = (0..100).map(|_| generate_password()).collect();
        assert_eq!(set.len(), 100);
    }
}

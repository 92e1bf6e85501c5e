use rand::Rng;
use std::collections::HashSet;

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const BRAND_PREFIX: &str = "NXSP";

fn random_part(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Produces an ID of the form `XXXX-XXXX-NXSPXX` over uppercase letters and digits.
pub fn generate() -> String {
    format!(
        "{}-{}-{}{}",
        random_part(4),
        random_part(4),
        BRAND_PREFIX,
        random_part(2)
    )
}

/// Per-run ledger of issued IDs. Collisions within a run are regenerated away;
/// across runs IDs stay only probabilistically unique.
#[derive(Default)]
pub struct IssuedIds(HashSet<String>);

impl IssuedIds {
    pub fn fresh(&mut self) -> String {
        loop {
            let id = generate();
            if self.0.insert(id.clone()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn generated_ids_match_the_published_format() {
        let pattern = Regex::new(r"^[A-Z0-9]{4}-[A-Z0-9]{4}-NXSP[A-Z0-9]{2}$").unwrap();
        for _ in 0..100 {
            let id = generate();
            assert!(pattern.is_match(&id), "unexpected id shape: {}", id);
        }
    }

    #[test]
    fn ledger_never_hands_out_the_same_id_twice() {
        let mut ledger = IssuedIds::default();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(ledger.fresh()));
        }
    }
}

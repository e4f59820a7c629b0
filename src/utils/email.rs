use std::collections::HashSet;

/// `nombre.apellido`, lowercased.
pub fn base_local_part(primer_nombre: &str, primer_apellido: &str) -> String {
    format!(
        "{}.{}",
        primer_nombre.to_lowercase(),
        primer_apellido.to_lowercase()
    )
}

/// The `n`-th address tried for a base; `0` is the bare address.
pub fn candidate(base: &str, domain: &str, n: u32) -> String {
    if n == 0 {
        format!("{}@{}", base, domain)
    } else {
        format!("{}{}@{}", base, n, domain)
    }
}

/// SQL `LIKE` pattern matching every candidate for a base.
pub fn candidates_pattern(base: &str, domain: &str) -> String {
    format!("{}%@{}", base, domain)
}

/// First candidate not contained in `taken`.
pub fn first_available<'a, I>(base: &str, domain: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = taken.into_iter().collect();
    let mut n = 0;
    loop {
        let email = candidate(base, domain, n);
        if !taken.contains(email.as_str()) {
            return email;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::Country;

    fn generate(nombre: &str, apellido: &str, country: Country, taken: &[String]) -> String {
        first_available(
            &base_local_part(nombre, apellido),
            country.email_domain(),
            taken.iter().map(String::as_str),
        )
    }

    #[test]
    fn bare_address_when_free() {
        assert_eq!(
            generate("ANA", "GOMEZ", Country::Colombia, &[]),
            "ana.gomez@cidenet.com.co"
        );
        assert_eq!(
            generate("John", "Smith", Country::UnitedStates, &[]),
            "john.smith@cidenet.com.us"
        );
    }

    #[test]
    fn suffix_increments_past_taken_addresses() {
        let taken = vec![
            "ana.gomez@cidenet.com.co".to_string(),
            "ana.gomez1@cidenet.com.co".to_string(),
        ];
        assert_eq!(
            generate("ana", "gomez", Country::Colombia, &taken),
            "ana.gomez2@cidenet.com.co"
        );
    }

    #[test]
    fn gaps_are_reused() {
        let taken = vec![
            "ana.gomez@cidenet.com.co".to_string(),
            "ana.gomez2@cidenet.com.co".to_string(),
        ];
        assert_eq!(
            generate("ana", "gomez", Country::Colombia, &taken),
            "ana.gomez1@cidenet.com.co"
        );
    }

    #[test]
    fn other_domain_does_not_collide() {
        let taken = vec!["ana.gomez@cidenet.com.co".to_string()];
        assert_eq!(
            generate("ana", "gomez", Country::UnitedStates, &taken),
            "ana.gomez@cidenet.com.us"
        );
    }
}

use anyhow::Result;

/// Outcome of asking an oracle about a candidate number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
    Unparseable(String),
}

/// Decides whether a candidate string is a real international phone number.
///
/// An `Err` means the oracle itself is broken, not that the number is bad;
/// bad numbers are always reported through [`Verdict`].
pub trait Oracle: Send + Sync {
    fn verdict(&self, candidate: &str) -> Result<Verdict>;
}

impl<F> Oracle for F
where
    F: Fn(&str) -> Result<Verdict> + Send + Sync,
{
    fn verdict(&self, candidate: &str) -> Result<Verdict> {
        self(candidate)
    }
}

/// Oracle backed by the libphonenumber metadata shipped with `phonenumber`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibPhoneNumber;

impl Oracle for LibPhoneNumber {
    fn verdict(&self, candidate: &str) -> Result<Verdict> {
        // No default region: the candidate has to carry its own country code.
        match phonenumber::parse(None, candidate) {
            Ok(number) if phonenumber::is_valid(&number) => Ok(Verdict::Valid),
            Ok(_) => Ok(Verdict::Invalid),
            Err(err) => Ok(Verdict::Unparseable(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_known_us_number() {
        let verdict = LibPhoneNumber.verdict("+16502530000").unwrap();
        assert_eq!(verdict, Verdict::Valid);
    }

    #[test]
    fn never_accepts_number_without_country_code() {
        let verdict = LibPhoneNumber.verdict("123456").unwrap();
        assert_ne!(verdict, Verdict::Valid);
    }

    #[test]
    fn garbage_is_unparseable() {
        let verdict = LibPhoneNumber.verdict("+").unwrap();
        assert!(matches!(verdict, Verdict::Unparseable(_)));
    }
}

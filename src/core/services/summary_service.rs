use crate::register::ShareRegister;

/// Headline figures shown above the shareholder grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterStats {
    pub total_shares: u64,
    pub total_votes: u64,
    pub shareholder_count: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn stats(register: &ShareRegister) -> RegisterStats {
        RegisterStats {
            total_shares: register.total_shares(),
            total_votes: register.total_votes(),
            shareholder_count: register.shareholders.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::{ShareClass, ShareRegister, Shareholder};

    #[test]
    fn empty_register_yields_zeros() {
        let register = ShareRegister::new("Nystartat AB", "556111-1111", 25_000.0);
        let stats = SummaryService::stats(&register);
        assert_eq!(stats.total_shares, 0);
        assert_eq!(stats.total_votes, 0);
        assert_eq!(stats.shareholder_count, 0);
    }

    #[test]
    fn mixed_classes_weight_votes() {
        let mut register = ShareRegister::new("Testbolaget AB", "556000-0000", 100_000.0);
        register.add_shareholder(Shareholder::new(
            "Anna Alm",
            "19800101-1234",
            100,
            ShareClass::A,
            1,
            100,
        ));
        register.add_shareholder(Shareholder::new(
            "Bertil Berg",
            "19750505-5678",
            900,
            ShareClass::B,
            101,
            1000,
        ));
        let stats = SummaryService::stats(&register);
        assert_eq!(stats.total_shares, 1000);
        assert_eq!(stats.total_votes, 100 * 10 + 900);
        assert_eq!(stats.shareholder_count, 2);
    }
}

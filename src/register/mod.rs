pub mod register;
pub mod shareholder;
pub mod transaction;
pub mod verification;

pub use register::ShareRegister;
pub use shareholder::{ShareClass, Shareholder};
pub use transaction::TransactionKind;
pub use verification::{
    Verification, VerificationRow, ACCOUNT_BANK, ACCOUNT_SHARE_CAPITAL, ACCOUNT_SHARE_PREMIUM,
};

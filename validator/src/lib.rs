pub mod event;
pub mod normalize;
pub mod oracle;

pub use normalize::{
    NormalizationResult, Normalizer, PhoneInput, Status, clean_phone, is_valid_phone, normalize,
};
pub use oracle::{LibPhoneNumber, Oracle, Verdict};

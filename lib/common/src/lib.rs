mod error;

pub use error::{BudgetExceeded, ConvertError, MalformedInputError, TextPosition};

pub type ConvertResult<T> = Result<T, ConvertError>;

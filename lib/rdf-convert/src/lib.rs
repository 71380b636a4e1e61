#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod convert;

pub use convert::{convert, default_registry, Converter};

pub mod error {
    pub use rdf_convert_common::*;
}

pub mod format {
    pub use rdf_convert_format::*;
}

pub mod io {
    pub use rdf_convert_io::*;
}

pub mod model {
    pub use rdf_convert_model::*;
}

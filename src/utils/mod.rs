pub mod file_operations;

pub use file_operations::{
    copy_file, extension_of, system_time_to_datetime, ExtensionSet, DEFAULT_EXTENSION_SEPARATOR,
};

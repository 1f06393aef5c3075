//! Constants used throughout the metadata core crate.

/// Default directory for the file-backed metadata store when none is configured.
pub const DEFAULT_METADATA_DIR: &str = "metadata_store";

/// File extension of stored metadata records.
pub const RECORD_FILE_EXTENSION: &str = "yaml";

/// Suffix of the temporary sibling written before a record file is renamed into place.
pub const TEMP_FILE_SUFFIX: &str = "tmp";

/// Environment variable naming the metadata store directory.
pub const METADATA_DIR_ENV: &str = "EMR_METADATA_DIR";

/// Environment variable selecting the reconcile policy (`install-once` or `sync`).
pub const RECONCILE_POLICY_ENV: &str = "EMR_RECONCILE_POLICY";

/// `chrono` format used by report converters: day, month, four-digit year.
pub const REPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Name of the Luhn mod-25 check-digit validator.
pub const LUHN_MOD_25: &str = "luhn-mod-25";

/// Characters of the Luhn mod-25 alphabet, in code-point order.
pub const LUHN_MOD_25_ALPHABET: &str = "0123456789ACDEFGHJKLMNPRT";

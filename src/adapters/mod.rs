// Adapters layer: concrete fleet sources and storage backends.

pub mod csv_source;
pub mod storage;
pub mod supabase;

pub use csv_source::CsvFleetSource;
pub use storage::LocalStorage;
pub use supabase::{SupabaseConfig, SupabaseSource};

pub mod csv_price_history;

pub use csv_price_history::CsvPriceHistorySource;

// Text understanding exports
pub mod extract;
pub mod text;

pub use extract::{extract_cities, extract_city, extract_query, DEFAULT_CITY, FALLBACK_TOPIC_QUERY};
pub use text::{contains_term, contains_word_prefix, title_case};

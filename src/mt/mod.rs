/// Machine Translation Module
///
/// Providers for the asynchronous translation fallback: phrases missing
/// from the static dictionary are sent to a `MachineTranslator`.
///
/// 1. **MT Trait** - provider abstraction, one phrase per call
/// 2. **Google Translate** - HTTP provider for the v2 API
/// 3. **Mock** - deterministic provider for tests and offline use
/// 4. **Cache** - memoization by `(phrase, language)` over any provider
///
/// # Example
///
/// ```ignore
/// use civic_i18n::mt::{CachingTranslator, GoogleTranslateProvider, MachineTranslator};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = CachingTranslator::new(Arc::new(GoogleTranslateProvider::from_env()?));
///     println!("{}", provider.translate("Create Issue", "en", "ta").await?);
///     Ok(())
/// }
/// ```
pub mod cache;
pub mod error;
pub mod google_translate;
pub mod mock;
pub mod translator;

pub use cache::CachingTranslator;
pub use error::{MtError, MtResult};
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use translator::MachineTranslator;

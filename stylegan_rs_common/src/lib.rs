mod model_source;
mod progress;
mod tokens;

pub use model_source::*;
pub use progress::NiceProgressBar;
pub use tokens::get_token;
pub use tokens::TokenSource;

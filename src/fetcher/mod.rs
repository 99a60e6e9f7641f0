//! Media retrieval
//!
//! Retrieval is modelled as the [`MediaFetcher`] trait so the pipeline can run
//! against the real `yt-dlp` adapter ([`YtDlpFetcher`]) or against an in-memory
//! fake in tests.
//!
//! ## Usage
//!
//! ```no_run
//! use voxstrip::fetcher::{MediaFetcher, YtDlpFetcher};
//! use voxstrip::naming::ArtifactNamer;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let namer = ArtifactNamer::new("/srv/uploads", "webm");
//!     let fetcher = YtDlpFetcher::from_path(namer).expect("yt-dlp not found");
//!
//!     let source = fetcher
//!         .fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &CancellationToken::new())
//!         .await?;
//!     println!("fetched {}", source.path.display());
//!     Ok(())
//! }
//! ```

mod parser;
mod traits;
mod ytdlp;

pub use parser::{MediaInfo, parse_info_json, parse_title_output};
pub use traits::MediaFetcher;
pub use ytdlp::YtDlpFetcher;

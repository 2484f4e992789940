/// Data layer: location lookup, measurement parsing, matching and merging.
///
/// Architecture:
/// ```text
///  locations.csv          xrd/*.csv
///        │                    │
///        ▼                    │
///   ┌──────────┐              │
///   │  loader   │ → LocationTable
///   └──────────┘              │
///        │                    │
///        ▼                    ▼
///   ┌─────────────┐   ids without location,
///   │ consistency  │  locations without file → RunLog
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐   per file: matcher → loader (data block) → tag
///   │  merge    │ → Vec<MergedRow>
///   └──────────┘
/// ```

pub mod consistency;
pub mod loader;
pub mod matcher;
pub mod merge;
pub mod model;

//! Advertisement decoding and detection bookkeeping

pub mod base64;
pub mod parser;
pub mod registry;

pub use parser::{parse_ibeacon_base64, parse_ibeacon_bytes, parse_manufacturer_data, IBeaconFrame};
pub use registry::{Admission, BeaconRegistry, Sighting};

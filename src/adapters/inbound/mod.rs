mod api_server;

pub use api_server::{cors_layer, router, ApiServer, ApiState};

// Re-export for external use (e.g., integration tests)
#[allow(unused_imports)]
pub use api_server::{ApiResponse, ErrorResponse, LocationRequest};

pub mod request;
pub mod response;
pub mod validation;

pub use request::{JsonRpcRequest, Params, RpcId};
pub use response::{JsonRpcError, JsonRpcResponse, JSONRPC_VERSION};
pub use validation::{read_id, validate_request};

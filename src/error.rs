use thiserror::Error;

/// Problems with a deployment plan that are detected before (or instead
/// of) submitting a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
	#[error("no address recorded for `{0}`")]
	UnknownContract(String),

	#[error("`{0}` already has an address; refusing to deploy it again")]
	AlreadyPresent(String),

	#[error("invalid address for `{name}`: {reason}")]
	BadAddress { name: String, reason: String },

	#[error("unknown network `{0}`")]
	UnknownNetwork(String),

	#[error("network `{0}` has no RPC endpoint configured")]
	NoRpcEndpoint(String),

	#[error("no artifact named `{0}`")]
	MissingArtifact(String),

	#[error("`{target}` expects {expected} argument(s), plan gives {given}")]
	Arity {
		target: String,
		expected: usize,
		given: usize,
	},

	#[error("invalid method signature `{signature}`: {reason}")]
	BadSignature { signature: String, reason: String },

	#[error("cannot encode argument {index} of `{target}`: {reason}")]
	BadArgument {
		target: String,
		index: usize,
		reason: String,
	},
}

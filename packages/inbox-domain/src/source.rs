use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
	MissingOrigin,
	UntrustedOrigin(IpAddr),
	MissingRecipient,
}

/// Decides whether a webhook call comes from the email provider.
#[derive(Debug, Clone)]
pub struct SourceVerifier {
	allowed: Vec<IpAddr>,
}
impl SourceVerifier {
	pub fn new(allowed: Vec<IpAddr>) -> Self {
		Self { allowed }
	}

	pub fn is_trusted(&self, origin: IpAddr) -> bool {
		let origin = origin.to_canonical();

		self.allowed.iter().any(|allowed| allowed.to_canonical() == origin)
	}

	/// Checks the caller alone, before the body is trusted enough to be parsed.
	pub fn verify_origin(&self, origin: Option<IpAddr>) -> Result<IpAddr, Rejection> {
		let origin = origin.ok_or(Rejection::MissingOrigin)?;

		if !self.is_trusted(origin) {
			return Err(Rejection::UntrustedOrigin(origin));
		}

		Ok(origin)
	}

	/// Accepts only a trusted origin whose body names a non-empty original recipient.
	pub fn verify(
		&self,
		origin: Option<IpAddr>,
		original_recipient: Option<&str>,
	) -> Result<(), Rejection> {
		self.verify_origin(origin)?;

		if original_recipient.map(str::trim).unwrap_or_default().is_empty() {
			return Err(Rejection::MissingRecipient);
		}

		Ok(())
	}
}

/// Reads the caller address from a proxy header value, e.g. `x-forwarded-for`.
///
/// Only the first comma-separated entry is used; it is the client as seen by the first proxy.
pub fn parse_forwarded_ip(raw: &str) -> Option<IpAddr> {
	let first = raw.split(',').next()?.trim();

	first.parse().ok()
}

//! Safe contract versions.
//!
//! Digest layouts changed between Safe releases, so versions are compared
//! numerically component by component. String comparison would order
//! `1.10.0` before `1.3.0`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing a Safe version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
	#[error("Empty version string")]
	Empty,
	#[error("Invalid version '{0}': expected MAJOR.MINOR.PATCH")]
	InvalidFormat(String),
	#[error("Invalid version component '{component}' in '{version}'")]
	InvalidComponent { version: String, component: String },
}

/// A parsed Safe contract version such as `1.3.0` or `1.4.1+L2`.
///
/// Build metadata (`+L2`) is kept for display but ignored when comparing.
/// A pre-release (`1.3.0-rc.1`) orders below its release.
#[derive(Debug, Clone, Eq)]
pub struct SafeVersion {
	pub major: u64,
	pub minor: u64,
	pub patch: u64,
	pub pre_release: Option<String>,
	pub build: Option<String>,
}

impl SafeVersion {
	/// First version whose EIP-712 domain includes `chainId`.
	pub const CHAIN_ID_IN_DOMAIN: SafeVersion = SafeVersion::new(1, 3, 0);
	/// First version whose SafeTx struct names the refund gas field `baseGas`.
	pub const BASE_GAS_FIELD: SafeVersion = SafeVersion::new(1, 0, 0);

	pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
		Self {
			major,
			minor,
			patch,
			pre_release: None,
			build: None,
		}
	}

	/// True when this version satisfies `>= other`.
	pub fn at_least(&self, other: &SafeVersion) -> bool {
		self >= other
	}
}

impl FromStr for SafeVersion {
	type Err = VersionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		if trimmed.is_empty() {
			return Err(VersionError::Empty);
		}

		let (rest, build) = match trimmed.split_once('+') {
			Some((rest, build)) => (rest, Some(build.to_string())),
			None => (trimmed, None),
		};
		let (core, pre_release) = match rest.split_once('-') {
			Some((core, pre)) => (core, Some(pre.to_string())),
			None => (rest, None),
		};

		let components: Vec<&str> = core.split('.').collect();
		if components.len() != 3 {
			return Err(VersionError::InvalidFormat(trimmed.to_string()));
		}

		let parse = |component: &str| {
			component
				.parse::<u64>()
				.map_err(|_| VersionError::InvalidComponent {
					version: trimmed.to_string(),
					component: component.to_string(),
				})
		};

		Ok(Self {
			major: parse(components[0])?,
			minor: parse(components[1])?,
			patch: parse(components[2])?,
			pre_release: pre_release.filter(|p| !p.is_empty()),
			build: build.filter(|b| !b.is_empty()),
		})
	}
}

impl PartialEq for SafeVersion {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl PartialOrd for SafeVersion {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for SafeVersion {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.major, self.minor, self.patch)
			.cmp(&(other.major, other.minor, other.patch))
			.then_with(|| match (&self.pre_release, &other.pre_release) {
				(None, None) => Ordering::Equal,
				(Some(_), None) => Ordering::Less,
				(None, Some(_)) => Ordering::Greater,
				(Some(a), Some(b)) => a.cmp(b),
			})
	}
}

impl fmt::Display for SafeVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
		if let Some(pre) = &self.pre_release {
			write!(f, "-{}", pre)?;
		}
		if let Some(build) = &self.build {
			write!(f, "+{}", build)?;
		}
		Ok(())
	}
}

impl Serialize for SafeVersion {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for SafeVersion {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

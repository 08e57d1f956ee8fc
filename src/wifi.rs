//! WiFi credentials and the `WIFI:` QR payload.
//!
//! A [`Credential`] is validated once when it is built and is immutable
//! afterwards. [`Credential::to_payload`] turns it into the text that phone
//! cameras recognise as a "join this network" code:
//!
//! ```text
//! WIFI:S:<ssid>;T:<security>;P:<password>;H:true;;
//! ```
//!
//! `P` is left out for open networks and `H` only appears for hidden ones.

use std::fmt;
use std::str::FromStr;

use crate::error::CredentialError;

/// Longest SSID accepted, in characters.
pub const MAX_SSID_LEN: usize = 32;

/// Shortest WPA/WPA2 passphrase.
pub const MIN_WPA_PASSWORD_LEN: usize = 8;

/// Longest WPA/WPA2 passphrase.
pub const MAX_WPA_PASSWORD_LEN: usize = 63;

/// Valid WEP key lengths in hex digits (64-, 128- and 256-bit keys).
pub const WEP_KEY_LENGTHS: [usize; 3] = [10, 26, 58];

/// Authentication scheme advertised by a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Security {
    Wpa,
    Wpa2,
    Wep,
    /// No password (`nopass` on the wire).
    Open,
}

impl Security {
    /// Wire tokens accepted on input, compared case-insensitively.
    pub const SUPPORTED: [&'static str; 4] = ["WPA", "WPA2", "WEP", "nopass"];

    /// Token written into the `T:` field.
    pub fn token(self) -> &'static str {
        match self {
            Security::Wpa => "WPA",
            Security::Wpa2 => "WPA2",
            Security::Wep => "WEP",
            Security::Open => "nopass",
        }
    }

    pub fn requires_password(self) -> bool {
        !matches!(self, Security::Open)
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Security {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wpa" => Ok(Security::Wpa),
            "wpa2" => Ok(Security::Wpa2),
            "wep" => Ok(Security::Wep),
            "nopass" => Ok(Security::Open),
            _ => Err(CredentialError::UnsupportedSecurity {
                value: s.to_string(),
            }),
        }
    }
}

/// Connection details for one WiFi network.
///
/// # Example
///
/// ```rust
/// use qr_wifi::wifi::Credential;
///
/// let cred = Credential::new("MyNetwork", "wpa2", "password123", false).unwrap();
/// assert_eq!(cred.to_payload(), "WIFI:S:MyNetwork;T:WPA2;P:password123;;");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    ssid: String,
    security: Security,
    password: String,
    hidden: bool,
}

impl Credential {
    /// Validates the inputs and builds a credential.
    ///
    /// Checks run in a fixed order and the first failure is returned: SSID
    /// presence, SSID length, security type, then the password rules for
    /// that security type. Open networks skip the password rules and drop
    /// whatever password was supplied.
    pub fn new(
        ssid: impl Into<String>,
        security: &str,
        password: impl Into<String>,
        hidden: bool,
    ) -> Result<Self, CredentialError> {
        let ssid = ssid.into();
        validate_ssid(&ssid)?;

        let security: Security = security.parse()?;

        let mut password = password.into();
        if security.requires_password() {
            validate_password(security, &password)?;
        } else {
            password.clear();
        }

        Ok(Self {
            ssid,
            security,
            password,
            hidden,
        })
    }

    /// Shorthand for a visible network without a password.
    pub fn open(ssid: impl Into<String>) -> Result<Self, CredentialError> {
        Self::new(ssid, Security::Open.token(), String::new(), false)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn security(&self) -> Security {
        self.security
    }

    /// The password, empty for open networks.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Serializes the credential into a `WIFI:` payload.
    pub fn to_payload(&self) -> String {
        let mut payload = format!("WIFI:S:{};T:{};", escape(&self.ssid), self.security);
        if self.security.requires_password() {
            payload.push_str("P:");
            payload.push_str(&escape(&self.password));
            payload.push(';');
        }
        if self.hidden {
            payload.push_str("H:true;");
        }
        payload.push(';');
        payload
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("ssid", &self.ssid)
            .field("security", &self.security)
            .field("password", &"[REDACTED]")
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// Escapes a field value for the `WIFI:` grammar.
///
/// Backslash becomes `\\` and each of `;`, `:`, `,` and `"` gets a
/// backslash prefix. Everything else, including whitespace and non-ASCII
/// text, is passed through.
///
/// ```rust
/// assert_eq!(qr_wifi::wifi::escape(r"a;b\c"), r"a\;b\\c");
/// ```
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ':' | ',' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn validate_ssid(ssid: &str) -> Result<(), CredentialError> {
    if ssid.is_empty() {
        return Err(CredentialError::EmptySsid);
    }
    let len = ssid.chars().count();
    if len > MAX_SSID_LEN {
        return Err(CredentialError::SsidTooLong { len });
    }
    Ok(())
}

fn validate_password(security: Security, password: &str) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::MissingPassword { security });
    }
    let len = password.chars().count();
    match security {
        Security::Wpa | Security::Wpa2 => {
            if len < MIN_WPA_PASSWORD_LEN {
                return Err(CredentialError::PasswordTooShort { len });
            }
            if len > MAX_WPA_PASSWORD_LEN {
                return Err(CredentialError::PasswordTooLong { len });
            }
        }
        Security::Wep => {
            if !password.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(CredentialError::NonHexWepKey);
            }
            if !WEP_KEY_LENGTHS.contains(&len) {
                return Err(CredentialError::InvalidWepKeyLength { len });
            }
        }
        Security::Open => {}
    }
    Ok(())
}

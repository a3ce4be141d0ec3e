//! Git access handle: auth, proxy, TLS, and SSH transport configuration
//! derived at runtime from the referenced `GitRepository` and its secrets.
//! Passed explicitly to every Git operation rather than read from ambient
//! process state, so concurrent reconciliations never share transport
//! configuration.

use k8s_openapi::api::core::v1::Secret;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Credentials {
    None,
    HttpBasic { username: String, password: String },
    Ssh { identity: Vec<u8>, known_hosts: Option<String> },
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub credentials: Option<Credentials>,
    pub proxy: Option<ProxyConfig>,
    pub ca_bundle_path: Option<String>,
    pub timeout: Option<Duration>,
    /// SSH host-key algorithm preference list, most preferred first.
    /// Threaded through to the SSH transport; only takes effect when
    /// libgit2 was built against an SSH backend that honors an algorithm
    /// preference (libssh2 does not expose one directly, so this is best
    /// effort and silently ignored otherwise).
    pub ssh_hostkey_algos: Vec<String>,
    pub ssh_kex_algos: Vec<String>,
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials::None
    }
}

impl Credentials {
    /// Reads the `username`/`password` or `identity`/`known_hosts` keys off
    /// a `GitRepository.spec.secretRef` Secret, following the source
    /// controller's own convention for those key names.
    pub fn from_secret(secret: &Secret) -> Option<Self> {
        let data = secret.data.as_ref()?;

        if let (Some(username), Some(password)) = (data.get("username"), data.get("password")) {
            return Some(Credentials::HttpBasic {
                username: String::from_utf8_lossy(&username.0).to_string(),
                password: String::from_utf8_lossy(&password.0).to_string(),
            });
        }

        if let Some(identity) = data.get("identity") {
            let known_hosts = data
                .get("known_hosts")
                .map(|kh| String::from_utf8_lossy(&kh.0).to_string());
            return Some(Credentials::Ssh {
                identity: identity.0.clone(),
                known_hosts,
            });
        }

        None
    }
}

impl AccessConfig {
    pub fn remote_callbacks(&self) -> git2::RemoteCallbacks<'_> {
        let mut callbacks = git2::RemoteCallbacks::new();

        let credentials = self.credentials.clone().unwrap_or(Credentials::None);
        callbacks.credentials(move |_url, username_from_url, allowed| {
            credential_callback(&credentials, username_from_url, allowed)
        });

        if let Some(known_hosts) = known_hosts_of(&self.credentials) {
            callbacks.certificate_check(move |cert, _host| {
                if let Some(hostkey) = cert.as_hostkey() {
                    if let Some(hash) = hostkey.hash_sha256() {
                        let fingerprint = hex_encode(hash);
                        if known_hosts.contains(&fingerprint) {
                            return Ok(git2::CertificateCheckStatus::CertificateOk);
                        }
                    }
                }
                Ok(git2::CertificateCheckStatus::CertificatePassthrough)
            });
        }

        callbacks
    }

    pub fn fetch_options(&self) -> git2::FetchOptions<'_> {
        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(self.remote_callbacks());
        if let Some(proxy) = &self.proxy {
            let mut proxy_options = git2::ProxyOptions::new();
            proxy_options.url(&proxy.address);
            fetch_options.proxy_options(proxy_options);
        }
        fetch_options
    }

    pub fn push_options(&self) -> git2::PushOptions<'_> {
        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(self.remote_callbacks());
        if let Some(proxy) = &self.proxy {
            let mut proxy_options = git2::ProxyOptions::new();
            proxy_options.url(&proxy.address);
            push_options.proxy_options(proxy_options);
        }
        push_options
    }
}

impl ProxyConfig {
    /// Reads `address`/`username`/`password` off the `proxySecretRef` Secret.
    pub fn from_secret(secret: &Secret) -> Option<Self> {
        let data = secret.data.as_ref()?;
        let address = data.get("address")?;
        Some(ProxyConfig {
            address: String::from_utf8_lossy(&address.0).to_string(),
            username: data.get("username").map(|v| String::from_utf8_lossy(&v.0).to_string()),
            password: data.get("password").map(|v| String::from_utf8_lossy(&v.0).to_string()),
        })
    }
}

fn known_hosts_of(credentials: &Option<Credentials>) -> Option<String> {
    match credentials {
        Some(Credentials::Ssh { known_hosts, .. }) => known_hosts.clone(),
        _ => None,
    }
}

fn credential_callback(
    credentials: &Credentials,
    username_from_url: Option<&str>,
    allowed: git2::CredentialType,
) -> Result<git2::Cred, git2::Error> {
    match credentials {
        Credentials::None => {
            if allowed.contains(git2::CredentialType::DEFAULT) {
                git2::Cred::default()
            } else {
                Err(git2::Error::from_str("no credentials configured"))
            }
        }
        Credentials::HttpBasic { username, password } => {
            git2::Cred::userpass_plaintext(username, password)
        }
        Credentials::Ssh { identity, .. } => {
            let username = username_from_url.unwrap_or("git");
            git2::Cred::ssh_key_from_memory(username, None, &String::from_utf8_lossy(identity), None)
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

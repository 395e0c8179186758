// ── Typed client facade ──
//
// `EeroClient` pairs the request pipeline with the data mapper: every
// operation builds a descriptor, runs it through `ApiClient::execute` and
// maps the payload. Session handling is passed straight through.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use eero_api::{
    ApiClient, ContentFilter, DomainList, Error, NetworkResource, SessionIdentity, SessionState,
    endpoints,
};

use crate::convert::{Records, parse, speed_test_result};
use crate::model::{ClientDevice, EeroDevice, Network, Profile, ResourceId, SpeedTest};

/// Requested guest network state. `None` fields keep the current value.
#[derive(Debug, Clone, Default)]
pub struct GuestNetworkUpdate {
    pub enabled: bool,
    pub name: Option<String>,
    pub password: Option<SecretString>,
}

/// High-level client for the eero cloud API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EeroClient {
    api: Arc<ApiClient>,
    default_network: Option<ResourceId>,
}

impl EeroClient {
    pub fn new(api: ApiClient) -> Self {
        Self::from_shared(Arc::new(api))
    }

    pub fn from_shared(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            default_network: None,
        }
    }

    /// Network used when an operation is not given one explicitly.
    pub fn with_default_network(mut self, network: Option<ResourceId>) -> Self {
        self.default_network = network;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn default_network(&self) -> Option<&ResourceId> {
        self.default_network.as_ref()
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn session_state(&self) -> SessionState {
        self.api.session_state()
    }

    pub async fn start_login(&self, identifier: &str) -> Result<(), Error> {
        self.api.start_login(identifier).await
    }

    pub async fn verify(&self, code: &str) -> Result<SessionIdentity, Error> {
        self.api.verify(code).await
    }

    pub async fn resend_code(&self) -> Result<(), Error> {
        self.api.resend_code().await
    }

    pub async fn logout(&self) -> Result<(), Error> {
        self.api.logout().await
    }

    /// Renew the session token. Requires an existing session.
    pub async fn refresh_session(&self) -> Result<SessionIdentity, Error> {
        self.api.refresh_session().await
    }

    // ── Account ──────────────────────────────────────────────────────

    /// Account details, as the service returns them.
    pub async fn account(&self) -> Result<Arc<Value>, Error> {
        self.api.execute(&endpoints::account()).await
    }

    // ── Networks ─────────────────────────────────────────────────────

    pub async fn networks(&self) -> Result<Records<Network>, Error> {
        let data = self.api.execute(&endpoints::networks()).await?;
        Records::new(data)
    }

    pub async fn network(&self, network_id: &ResourceId) -> Result<Network, Error> {
        let data = self
            .api
            .execute(&endpoints::network(network_id.as_str()))
            .await?;
        parse(&data)
    }

    /// Pick the network to act on: `explicit`, else the configured default,
    /// else the first network on the account.
    pub async fn resolve_network(&self, explicit: Option<&str>) -> Result<ResourceId, Error> {
        if let Some(id) = explicit.filter(|s| !s.is_empty()) {
            return Ok(ResourceId::new(id));
        }
        if let Some(id) = &self.default_network {
            return Ok(id.clone());
        }

        let networks = self.networks().await?;
        let first = networks.iter().next().transpose()?.ok_or_else(|| Error::Api {
            status: 404,
            message: "no networks found on this account".into(),
        })?;
        debug!(network = %first.id, "using first network on the account");
        Ok(first.id)
    }

    pub async fn set_guest_network(
        &self,
        network_id: &ResourceId,
        update: &GuestNetworkUpdate,
    ) -> Result<(), Error> {
        let desc = endpoints::set_guest_network(
            network_id.as_str(),
            update.enabled,
            update.name.as_deref(),
            update.password.as_ref().map(|p| p.expose_secret()),
        );
        self.api.execute(&desc).await?;
        Ok(())
    }

    /// Start a speed test. Returns the measurement when the service
    /// answers with one; otherwise results land on the network record once
    /// measuring has finished.
    pub async fn run_speed_test(&self, network_id: &ResourceId) -> Result<Option<SpeedTest>, Error> {
        let data = self
            .api
            .execute(&endpoints::run_speed_test(network_id.as_str()))
            .await?;
        speed_test_result(&data)
    }

    /// Restart every eero on the network.
    pub async fn reboot_network(&self, network_id: &ResourceId) -> Result<(), Error> {
        self.api
            .execute(&endpoints::reboot_network(network_id.as_str()))
            .await?;
        Ok(())
    }

    /// Read one of the network's sub-resources untyped. `item` narrows to a
    /// single insight, burst reporter or device's transfer stats.
    pub async fn network_resource(
        &self,
        network_id: &ResourceId,
        resource: NetworkResource,
        item: Option<&str>,
    ) -> Result<Arc<Value>, Error> {
        self.api
            .execute(&endpoints::network_resource(network_id.as_str(), resource, item))
            .await
    }

    /// Start a diagnostics run and return the service's answer.
    pub async fn run_diagnostics(&self, network_id: &ResourceId) -> Result<Arc<Value>, Error> {
        self.api
            .execute(&endpoints::run_diagnostics(network_id.as_str()))
            .await
    }

    // ── Eeros ────────────────────────────────────────────────────────

    pub async fn eeros(&self, network_id: &ResourceId) -> Result<Records<EeroDevice>, Error> {
        let data = self
            .api
            .execute(&endpoints::eeros(network_id.as_str()))
            .await?;
        Records::new(data)
    }

    pub async fn eero(
        &self,
        network_id: &ResourceId,
        eero_id: &ResourceId,
    ) -> Result<EeroDevice, Error> {
        let data = self
            .api
            .execute(&endpoints::eero(network_id.as_str(), eero_id.as_str()))
            .await?;
        parse(&data)
    }

    pub async fn reboot_eero(
        &self,
        network_id: &ResourceId,
        eero_id: &ResourceId,
    ) -> Result<(), Error> {
        self.api
            .execute(&endpoints::reboot_eero(network_id.as_str(), eero_id.as_str()))
            .await?;
        Ok(())
    }

    // ── Client devices ───────────────────────────────────────────────

    pub async fn devices(&self, network_id: &ResourceId) -> Result<Records<ClientDevice>, Error> {
        let data = self
            .api
            .execute(&endpoints::devices(network_id.as_str()))
            .await?;
        Records::new(data)
    }

    pub async fn device(
        &self,
        network_id: &ResourceId,
        device_id: &ResourceId,
    ) -> Result<ClientDevice, Error> {
        let data = self
            .api
            .execute(&endpoints::device(network_id.as_str(), device_id.as_str()))
            .await?;
        parse(&data)
    }

    pub async fn block_device(
        &self,
        network_id: &ResourceId,
        device_id: &ResourceId,
        blocked: bool,
    ) -> Result<(), Error> {
        self.api
            .execute(&endpoints::set_device_blocked(
                network_id.as_str(),
                device_id.as_str(),
                blocked,
            ))
            .await?;
        Ok(())
    }

    pub async fn rename_device(
        &self,
        network_id: &ResourceId,
        device_id: &ResourceId,
        nickname: &str,
    ) -> Result<(), Error> {
        self.api
            .execute(&endpoints::rename_device(
                network_id.as_str(),
                device_id.as_str(),
                nickname,
            ))
            .await?;
        Ok(())
    }

    // ── Profiles ─────────────────────────────────────────────────────

    pub async fn profiles(&self, network_id: &ResourceId) -> Result<Records<Profile>, Error> {
        let data = self
            .api
            .execute(&endpoints::profiles(network_id.as_str()))
            .await?;
        Records::new(data)
    }

    pub async fn profile(
        &self,
        network_id: &ResourceId,
        profile_id: &ResourceId,
    ) -> Result<Profile, Error> {
        let data = self
            .api
            .execute(&endpoints::profile(network_id.as_str(), profile_id.as_str()))
            .await?;
        parse(&data)
    }

    pub async fn pause_profile(
        &self,
        network_id: &ResourceId,
        profile_id: &ResourceId,
        paused: bool,
    ) -> Result<(), Error> {
        self.api
            .execute(&endpoints::set_profile_paused(
                network_id.as_str(),
                profile_id.as_str(),
                paused,
            ))
            .await?;
        Ok(())
    }

    /// Turn content filter categories on or off. Unlisted categories keep
    /// their setting.
    pub async fn set_content_filter(
        &self,
        network_id: &ResourceId,
        profile_id: &ResourceId,
        filters: &[(ContentFilter, bool)],
    ) -> Result<(), Error> {
        self.api
            .execute(&endpoints::set_profile_content_filter(
                network_id.as_str(),
                profile_id.as_str(),
                filters,
            ))
            .await?;
        Ok(())
    }

    /// Replace a profile's custom block or allow list.
    pub async fn set_domain_list(
        &self,
        network_id: &ResourceId,
        profile_id: &ResourceId,
        list: DomainList,
        domains: &[String],
    ) -> Result<(), Error> {
        self.api
            .execute(&endpoints::set_profile_domain_list(
                network_id.as_str(),
                profile_id.as_str(),
                list,
                domains,
            ))
            .await?;
        Ok(())
    }
}

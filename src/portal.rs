//! Wiring of the session, gateway and every client from one [`AppConfig`]
use std::sync::Arc;

use crate::accounts::Accounts;
use crate::api::{EndpointError, Endpoints};
use crate::config::AppConfig;
use crate::controller::ListController;
use crate::dashboard::Dashboard;
use crate::gateway::{Gateway, ReqwestTransport, Transport};
use crate::notifier::Notifier;
use crate::resource::{Resource, ResourceClient};
use crate::resources::{MemberDirectory, MemberScope, OneToOnes, Referrals, TyfcbSlips};
use crate::session::{FileTokenStore, Session, TokenStore};
use crate::types::Direction;

#[derive(Clone)]
pub struct Portal {
    config: AppConfig,
    gateway: Gateway,
    endpoints: Arc<Endpoints>,
}

impl Portal {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, EndpointError> {
        let endpoints = Arc::new(Endpoints::from_config(&config)?);
        let session = Arc::new(Session::new(store, config.session.token_key.clone()));
        Ok(Self {
            config,
            gateway: Gateway::new(session, transport),
            endpoints,
        })
    }

    /// Token persisted under the config dir, real HTTP transport
    pub fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let store = FileTokenStore::in_dir(&config.config_dir()?);
        tracing::debug!(path = %store.path().display(), "using session file");
        Ok(Self::new(config, Arc::new(store), Arc::new(ReqwestTransport::new()))?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        self.gateway.session()
    }

    pub fn endpoints(&self) -> &Arc<Endpoints> {
        &self.endpoints
    }

    pub fn client<R: Resource>(&self) -> ResourceClient<R> {
        ResourceClient::new(self.gateway.clone(), self.endpoints.clone())
    }

    pub fn referrals(&self) -> ResourceClient<Referrals> {
        self.client()
    }

    pub fn tyfcb(&self) -> ResourceClient<TyfcbSlips> {
        self.client()
    }

    pub fn one_to_ones(&self) -> ResourceClient<OneToOnes> {
        self.client()
    }

    pub fn members(&self) -> MemberDirectory {
        MemberDirectory::new(self.gateway.clone(), self.endpoints.clone())
    }

    pub fn accounts(&self) -> Accounts {
        Accounts::new(self.gateway.clone(), self.endpoints.clone())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.gateway.clone(), self.endpoints.clone())
    }

    /// List controller over a resource using the configured page size
    pub fn list<R: Resource>(
        &self,
        notifier: Arc<dyn Notifier>,
        direction: Direction,
    ) -> ListController<ResourceClient<R>> {
        ListController::new(
            Arc::new(self.client::<R>()),
            notifier,
            direction,
            self.config.pagination.page_size,
        )
        .with_window_radius(self.config.pagination.window_radius)
    }

    pub fn member_list(&self, notifier: Arc<dyn Notifier>, scope: MemberScope) -> ListController<MemberDirectory> {
        ListController::new(
            Arc::new(self.members()),
            notifier,
            scope,
            self.config.pagination.member_page_size,
        )
        .with_window_radius(self.config.pagination.window_radius)
    }
}

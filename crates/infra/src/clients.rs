//! Client directory: each salesperson's own clients.

use tracing::{info, instrument};

use salesdesk_auth::{authorize, Actor};
use salesdesk_core::{Entity, ExpectedVersion};
use salesdesk_parties::{Client, ClientFilter, ClientId, ClientPatch, NewClient};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{EntityStore, Stored};

#[derive(Debug)]
pub struct ClientDirectory<C> {
    clients: C,
}

impl<C> ClientDirectory<C> {
    pub fn new(clients: C) -> Self {
        Self { clients }
    }
}

impl<C> ClientDirectory<C>
where
    C: EntityStore<Client>,
{
    /// Register a client owned by the actor. E-mail addresses are unique.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id()), err)]
    pub async fn create_client(&self, actor: &Actor, input: NewClient) -> ServiceResult<Client> {
        let client = Client::register(ClientId::generate(), input, actor.id())?;
        self.ensure_email_free(&client.email, None).await?;

        let stored = self.clients.insert(client).await?;
        info!(client_id = %stored.document.id, "client registered");
        Ok(stored.document)
    }

    pub async fn get_client(&self, actor: &Actor, id: ClientId) -> ServiceResult<Client> {
        let client = self.load(id).await?.document;
        authorize(actor, &client.salesperson())?;
        Ok(client)
    }

    pub async fn list_clients(&self, actor: &Actor) -> ServiceResult<Vec<Client>> {
        Ok(self
            .clients
            .find(&ClientFilter::owned_by(actor.id()))
            .await?
            .into_iter()
            .map(Stored::into_document)
            .collect())
    }

    /// Edit contact fields. The owning salesperson never changes.
    #[instrument(skip(self, actor, patch), fields(actor = %actor.id(), client_id = %id), err)]
    pub async fn update_client(&self, actor: &Actor, id: ClientId, patch: ClientPatch) -> ServiceResult<Client> {
        let Stored { document: mut client, version } = self.load(id).await?;
        authorize(actor, &client.salesperson())?;

        let previous_email = client.email.clone();
        client.apply_patch(patch)?;
        if client.email != previous_email {
            self.ensure_email_free(&client.email, Some(id)).await?;
        }

        let stored = self
            .clients
            .update(&id, ExpectedVersion::Exact(version), client)
            .await?;
        Ok(stored.document)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id(), client_id = %id), err)]
    pub async fn delete_client(&self, actor: &Actor, id: ClientId) -> ServiceResult<()> {
        let Stored { document: client, version } = self.load(id).await?;
        authorize(actor, &client.salesperson())?;

        if !self.clients.delete(&id, ExpectedVersion::Exact(version)).await? {
            return Err(ServiceError::not_found(Client::COLLECTION, id));
        }
        info!("client deleted");
        Ok(())
    }

    async fn load(&self, id: ClientId) -> ServiceResult<Stored<Client>> {
        self.clients
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Client::COLLECTION, id))
    }

    async fn ensure_email_free(&self, email: &str, except: Option<ClientId>) -> ServiceResult<()> {
        let taken = self
            .clients
            .find(&ClientFilter::with_email(email))
            .await?
            .into_iter()
            .any(|s| Some(s.document.id) != except);
        if taken {
            return Err(ServiceError::AlreadyExists {
                kind: Client::COLLECTION,
                key: email.to_string(),
            });
        }
        Ok(())
    }
}

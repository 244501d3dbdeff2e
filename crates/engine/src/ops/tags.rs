use crate::{RecordStore, ResultEngine, Tag, page::{Page, PageRequest}};

use super::{Engine, normalize_required_name, require_organization};

impl<S: RecordStore> Engine<S> {
    /// Creates a tag for an organization.
    ///
    /// Names are trimmed and must not be empty; they are not unique.
    pub async fn create_tag(&self, organization_id: i64, name: &str) -> ResultEngine<Tag> {
        let organization_id = require_organization(organization_id)?;
        let name = normalize_required_name(name, "tag")?;

        let tag = self.store.insert_tag(organization_id, &name).await?;
        tracing::debug!(organization_id, tag_id = tag.id, "tag created");
        Ok(tag)
    }

    pub async fn list_tags(
        &self,
        organization_id: i64,
        page: PageRequest,
    ) -> ResultEngine<Page<Tag>> {
        let organization_id = require_organization(organization_id)?;
        self.store.list_tags(organization_id, page).await
    }
}

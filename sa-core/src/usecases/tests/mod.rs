use super::prelude::*;
use std::{
    cell::{Cell, RefCell},
    cmp::Reverse,
    collections::{BTreeMap, HashSet},
    result,
};

type RepoResult<T> = result::Result<T, RepoError>;

trait Key {
    fn key(&self) -> &str;
}

impl Key for User {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Key for DataSet {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Key for Place {
    fn key(&self) -> &str {
        self.id().as_str()
    }
}

impl Key for Submission {
    fn key(&self) -> &str {
        self.id().as_str()
    }
}

impl Key for SubmissionSet {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Key for Attachment {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Key for DataIndex {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Key for IndexedValue {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Key for ApiKey {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Key for Group {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

#[derive(Default)]
pub struct MockDb {
    pub users: RefCell<Vec<User>>,
    pub datasets: RefCell<Vec<DataSet>>,
    pub places: RefCell<Vec<Place>>,
    pub submission_sets: RefCell<Vec<SubmissionSet>>,
    pub submissions: RefCell<Vec<Submission>>,
    pub attachments: RefCell<Vec<Attachment>>,
    pub actions: RefCell<Vec<Action>>,
    pub data_indexes: RefCell<Vec<DataIndex>>,
    pub indexed_values: RefCell<Vec<IndexedValue>>,
    pub permissions: RefCell<Vec<(PermissionScope, DataPermission)>>,
    pub api_keys: RefCell<Vec<ApiKey>>,
    pub groups: RefCell<Vec<Group>>,
    pub group_members: RefCell<Vec<(Id, Id)>>,
    pub dataset_loads: Cell<usize>,
    pub place_loads: Cell<usize>,
    pub submission_set_loads: Cell<usize>,
}

impl MockDb {
    pub fn add_permission(&self, scope: PermissionScope, permission: DataPermission) {
        self.permissions.borrow_mut().push((scope, permission));
    }

    fn thing_ids_of_dataset(&self, dataset_id: &str) -> HashSet<Id> {
        self.things_of_dataset(dataset_id)
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.id)
            .collect()
    }

    fn delete_scope(&self, scope: &PermissionScope) {
        self.permissions.borrow_mut().retain(|(s, _)| s != scope);
    }

    fn delete_thing_dependencies(&self, thing_id: &str) {
        self.indexed_values
            .borrow_mut()
            .retain(|v| v.thing_id != thing_id);
        self.attachments
            .borrow_mut()
            .retain(|a| a.thing_id != thing_id);
        self.actions.borrow_mut().retain(|a| a.thing_id != thing_id);
    }
}

fn get<T: Clone + Key>(objects: &[T], id: &str) -> RepoResult<T> {
    match objects.iter().find(|x| x.key() == id) {
        Some(x) => Ok(x.clone()),
        None => Err(RepoError::NotFound),
    }
}

fn create<T: Clone + Key>(objects: &mut Vec<T>, e: T) -> RepoResult<()> {
    if objects.iter().any(|x| x.key() == e.key()) {
        return Err(RepoError::AlreadyExists);
    }
    objects.push(e);
    Ok(())
}

fn update<T: Clone + Key>(objects: &mut [T], e: &T) -> RepoResult<()> {
    if let Some(pos) = objects.iter().position(|x| x.key() == e.key()) {
        objects[pos] = e.clone();
    } else {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

fn delete<T: Clone + Key>(objects: &mut Vec<T>, id: &str) -> RepoResult<()> {
    if let Some(pos) = objects.iter().position(|x| x.key() == id) {
        objects.remove(pos);
    } else {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

impl UserRepo for MockDb {
    fn create_user(&self, user: &User) -> RepoResult<()> {
        if self
            .users
            .borrow()
            .iter()
            .any(|u| u.username == user.username)
        {
            return Err(RepoError::AlreadyExists);
        }
        create(&mut self.users.borrow_mut(), user.clone())
    }
    fn update_user(&self, user: &User) -> RepoResult<()> {
        update(&mut self.users.borrow_mut(), user)
    }
    fn get_user(&self, id: &str) -> RepoResult<User> {
        get(&self.users.borrow(), id)
    }
    fn get_user_by_username(&self, username: &str) -> RepoResult<User> {
        self.users
            .borrow()
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(RepoError::NotFound)
    }
    fn all_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.users.borrow().clone())
    }
}

impl DataSetRepo for MockDb {
    fn create_dataset(&self, dataset: &DataSet) -> RepoResult<()> {
        if self
            .datasets
            .borrow()
            .iter()
            .any(|d| d.owner.id == dataset.owner.id && d.slug == dataset.slug)
        {
            return Err(RepoError::AlreadyExists);
        }
        create(&mut self.datasets.borrow_mut(), dataset.clone())
    }
    fn update_dataset(&self, dataset: &DataSet) -> RepoResult<()> {
        update(&mut self.datasets.borrow_mut(), dataset)
    }
    fn delete_dataset(&self, id: &str) -> RepoResult<()> {
        delete(&mut self.datasets.borrow_mut(), id)?;
        for thing_id in self.thing_ids_of_dataset(id) {
            self.delete_thing(thing_id.as_str())?;
        }
        let index_ids: Vec<_> = self
            .data_indexes
            .borrow()
            .iter()
            .filter(|i| i.dataset_id == id)
            .map(|i| i.id.clone())
            .collect();
        for index_id in index_ids {
            self.delete_data_index(index_id.as_str())?;
        }
        let key_ids: Vec<_> = self
            .api_keys
            .borrow()
            .iter()
            .filter(|k| k.dataset_id == id)
            .map(|k| k.id.clone())
            .collect();
        for key_id in key_ids {
            self.delete_scope(&PermissionScope::Key(key_id.clone()));
            delete(&mut self.api_keys.borrow_mut(), key_id.as_str())?;
        }
        for group in self.groups_of_dataset(id)? {
            self.delete_scope(&PermissionScope::Group(group.id.clone()));
            self.group_members
                .borrow_mut()
                .retain(|(group_id, _)| *group_id != group.id);
            delete(&mut self.groups.borrow_mut(), group.id.as_str())?;
        }
        self.delete_scope(&PermissionScope::DataSet(id.into()));
        Ok(())
    }
    fn get_dataset(&self, id: &str) -> RepoResult<DataSet> {
        self.dataset_loads.set(self.dataset_loads.get() + 1);
        get(&self.datasets.borrow(), id)
    }
    fn get_dataset_by_slug(&self, owner_username: &str, slug: &str) -> RepoResult<DataSet> {
        self.datasets
            .borrow()
            .iter()
            .find(|d| d.owner.username == owner_username && d.slug == slug)
            .cloned()
            .ok_or(RepoError::NotFound)
    }
    fn datasets_of_owner(&self, owner_id: &str) -> RepoResult<Vec<DataSet>> {
        Ok(self
            .datasets
            .borrow()
            .iter()
            .filter(|d| d.owner.id == owner_id)
            .cloned()
            .collect())
    }
}

impl ThingRepo for MockDb {
    fn get_thing(&self, id: &str) -> RepoResult<(Thing, ThingKind)> {
        if let Ok(place) = get(&self.places.borrow(), id) {
            return Ok((place.thing, ThingKind::Place));
        }
        get(&self.submissions.borrow(), id).map(|s| (s.thing, ThingKind::Submission))
    }
    fn things_of_dataset(&self, dataset_id: &str) -> RepoResult<Vec<Thing>> {
        let places = self.places.borrow();
        let submissions = self.submissions.borrow();
        Ok(places
            .iter()
            .map(|p| &p.thing)
            .chain(submissions.iter().map(|s| &s.thing))
            .filter(|t| t.dataset_id == dataset_id)
            .cloned()
            .collect())
    }
    fn delete_thing(&self, id: &str) -> RepoResult<()> {
        let (_, kind) = self.get_thing(id)?;
        match kind {
            ThingKind::Place => {
                delete(&mut self.places.borrow_mut(), id)?;
                let set_ids: HashSet<Id> = self
                    .submission_sets
                    .borrow()
                    .iter()
                    .filter(|s| s.place_id == id)
                    .map(|s| s.id.clone())
                    .collect();
                let submission_ids: Vec<Id> = self
                    .submissions
                    .borrow()
                    .iter()
                    .filter(|s| set_ids.contains(&s.parent_id))
                    .map(|s| s.id().clone())
                    .collect();
                for submission_id in submission_ids {
                    self.delete_thing(submission_id.as_str())?;
                }
                self.submission_sets
                    .borrow_mut()
                    .retain(|s| !set_ids.contains(&s.id));
            }
            ThingKind::Submission => {
                delete(&mut self.submissions.borrow_mut(), id)?;
            }
        }
        self.delete_thing_dependencies(id);
        Ok(())
    }
}

impl PlaceRepo for MockDb {
    fn create_place(&self, place: &Place) -> RepoResult<()> {
        create(&mut self.places.borrow_mut(), place.clone())
    }
    fn update_place(&self, place: &Place) -> RepoResult<()> {
        update(&mut self.places.borrow_mut(), place)
    }
    fn get_place(&self, id: &str) -> RepoResult<Place> {
        self.place_loads.set(self.place_loads.get() + 1);
        get(&self.places.borrow(), id)
    }
    fn places_of_dataset(&self, dataset_id: &str) -> RepoResult<Vec<Place>> {
        Ok(self
            .places
            .borrow()
            .iter()
            .filter(|p| p.thing.dataset_id == dataset_id)
            .cloned()
            .collect())
    }
    fn count_places_of_dataset(&self, dataset_id: &str) -> RepoResult<usize> {
        Ok(self.places_of_dataset(dataset_id)?.len())
    }
}

impl SubmissionSetRepo for MockDb {
    fn create_submission_set(&self, set: &SubmissionSet) -> RepoResult<()> {
        if self
            .try_get_submission_set_by_name(set.place_id.as_str(), &set.name)?
            .is_some()
        {
            return Err(RepoError::AlreadyExists);
        }
        create(&mut self.submission_sets.borrow_mut(), set.clone())
    }
    fn get_submission_set(&self, id: &str) -> RepoResult<SubmissionSet> {
        self.submission_set_loads
            .set(self.submission_set_loads.get() + 1);
        get(&self.submission_sets.borrow(), id)
    }
    fn try_get_submission_set_by_name(
        &self,
        place_id: &str,
        name: &str,
    ) -> RepoResult<Option<SubmissionSet>> {
        Ok(self
            .submission_sets
            .borrow()
            .iter()
            .find(|s| s.place_id == place_id && s.name == name)
            .cloned())
    }
    fn submission_sets_of_place(&self, place_id: &str) -> RepoResult<Vec<SubmissionSet>> {
        Ok(self
            .submission_sets
            .borrow()
            .iter()
            .filter(|s| s.place_id == place_id)
            .cloned()
            .collect())
    }
}

impl SubmissionRepo for MockDb {
    fn create_submission(&self, submission: &Submission) -> RepoResult<()> {
        create(&mut self.submissions.borrow_mut(), submission.clone())
    }
    fn update_submission(&self, submission: &Submission) -> RepoResult<()> {
        update(&mut self.submissions.borrow_mut(), submission)
    }
    fn get_submission(&self, id: &str) -> RepoResult<Submission> {
        get(&self.submissions.borrow(), id)
    }
    fn submissions_of_set(&self, set_id: &str) -> RepoResult<Vec<Submission>> {
        Ok(self
            .submissions
            .borrow()
            .iter()
            .filter(|s| s.parent_id == set_id)
            .cloned()
            .collect())
    }
    fn submissions_of_dataset(
        &self,
        dataset_id: &str,
        set_name: Option<&str>,
    ) -> RepoResult<Vec<(SubmissionSet, Submission)>> {
        let sets = self.submission_sets.borrow();
        Ok(self
            .submissions
            .borrow()
            .iter()
            .filter(|s| s.thing.dataset_id == dataset_id)
            .filter_map(|s| {
                sets.iter()
                    .find(|set| set.id == s.parent_id)
                    .map(|set| (set.clone(), s.clone()))
            })
            .filter(|(set, _)| set_name.map_or(true, |name| set.name == name))
            .collect())
    }
    fn count_visible_submissions(&self, dataset_id: &str) -> RepoResult<Vec<SubmissionSetCount>> {
        let mut counts = BTreeMap::<(Id, String), usize>::new();
        for (set, submission) in self.submissions_of_dataset(dataset_id, None)? {
            if submission.thing.visible {
                *counts.entry((set.place_id, set.name)).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|((place_id, set_name), length)| SubmissionSetCount {
                place_id,
                set_name,
                length,
            })
            .collect())
    }
}

impl AttachmentRepo for MockDb {
    fn create_attachment(&self, attachment: &Attachment) -> RepoResult<()> {
        create(&mut self.attachments.borrow_mut(), attachment.clone())
    }
    fn delete_attachment(&self, id: &str) -> RepoResult<()> {
        delete(&mut self.attachments.borrow_mut(), id)
    }
    fn get_attachment(&self, id: &str) -> RepoResult<Attachment> {
        get(&self.attachments.borrow(), id)
    }
    fn attachments_of_thing(&self, thing_id: &str) -> RepoResult<Vec<Attachment>> {
        Ok(self
            .attachments
            .borrow()
            .iter()
            .filter(|a| a.thing_id == thing_id)
            .cloned()
            .collect())
    }
    fn attachments_of_dataset(&self, dataset_id: &str) -> RepoResult<Vec<Attachment>> {
        let thing_ids = self.thing_ids_of_dataset(dataset_id);
        Ok(self
            .attachments
            .borrow()
            .iter()
            .filter(|a| thing_ids.contains(&a.thing_id))
            .cloned()
            .collect())
    }
}

impl ActionRepo for MockDb {
    fn create_action(&self, action: &Action) -> RepoResult<()> {
        self.actions.borrow_mut().push(action.clone());
        Ok(())
    }
    fn actions_of_dataset(&self, dataset_id: &str, limit: Option<usize>) -> RepoResult<Vec<Action>> {
        let thing_ids = self.thing_ids_of_dataset(dataset_id);
        let mut actions: Vec<_> = self
            .actions
            .borrow()
            .iter()
            .rev()
            .filter(|a| thing_ids.contains(&a.thing_id))
            .cloned()
            .collect();
        actions.sort_by_key(|a| Reverse(a.created_at));
        if let Some(limit) = limit {
            actions.truncate(limit);
        }
        Ok(actions)
    }
    fn actions_of_thing(&self, thing_id: &str) -> RepoResult<Vec<Action>> {
        Ok(self
            .actions
            .borrow()
            .iter()
            .filter(|a| a.thing_id == thing_id)
            .cloned()
            .collect())
    }
}

impl DataIndexRepo for MockDb {
    fn create_data_index(&self, index: &DataIndex) -> RepoResult<()> {
        if self
            .data_indexes
            .borrow()
            .iter()
            .any(|i| i.dataset_id == index.dataset_id && i.attr_name == index.attr_name)
        {
            return Err(RepoError::AlreadyExists);
        }
        create(&mut self.data_indexes.borrow_mut(), index.clone())
    }
    fn delete_data_index(&self, id: &str) -> RepoResult<()> {
        delete(&mut self.data_indexes.borrow_mut(), id)?;
        self.indexed_values
            .borrow_mut()
            .retain(|v| v.index_id != id);
        Ok(())
    }
    fn get_data_index(&self, id: &str) -> RepoResult<DataIndex> {
        get(&self.data_indexes.borrow(), id)
    }
    fn data_indexes_of_dataset(&self, dataset_id: &str) -> RepoResult<Vec<DataIndex>> {
        Ok(self
            .data_indexes
            .borrow()
            .iter()
            .filter(|i| i.dataset_id == dataset_id)
            .cloned()
            .collect())
    }
}

impl IndexedValueRepo for MockDb {
    fn create_indexed_value(&self, value: &IndexedValue) -> RepoResult<()> {
        create(&mut self.indexed_values.borrow_mut(), value.clone())
    }
    fn update_indexed_value(&self, value: &IndexedValue) -> RepoResult<()> {
        update(&mut self.indexed_values.borrow_mut(), value)
    }
    fn delete_indexed_value(&self, id: &str) -> RepoResult<()> {
        delete(&mut self.indexed_values.borrow_mut(), id)
    }
    fn indexed_values_of_thing(&self, thing_id: &str) -> RepoResult<Vec<IndexedValue>> {
        Ok(self
            .indexed_values
            .borrow()
            .iter()
            .filter(|v| v.thing_id == thing_id)
            .cloned()
            .collect())
    }
    fn indexed_values_of_index(&self, index_id: &str) -> RepoResult<Vec<IndexedValue>> {
        Ok(self
            .indexed_values
            .borrow()
            .iter()
            .filter(|v| v.index_id == index_id)
            .cloned()
            .collect())
    }
    fn thing_ids_by_indexed_value(&self, index_id: &str, value: &str) -> RepoResult<Vec<Id>> {
        Ok(self
            .indexed_values
            .borrow()
            .iter()
            .filter(|v| v.index_id == index_id && v.value == value)
            .map(|v| v.thing_id.clone())
            .collect())
    }
}

impl PermissionRepo for MockDb {
    fn create_permission(
        &self,
        scope: &PermissionScope,
        permission: &DataPermission,
    ) -> RepoResult<()> {
        self.add_permission(scope.clone(), permission.clone());
        Ok(())
    }
    fn update_permission(&self, permission: &DataPermission) -> RepoResult<()> {
        let mut permissions = self.permissions.borrow_mut();
        let (_, existing) = permissions
            .iter_mut()
            .find(|(_, p)| p.id == permission.id)
            .ok_or(RepoError::NotFound)?;
        *existing = permission.clone();
        Ok(())
    }
    fn delete_permission(&self, id: &str) -> RepoResult<()> {
        let mut permissions = self.permissions.borrow_mut();
        let pos = permissions
            .iter()
            .position(|(_, p)| p.id == id)
            .ok_or(RepoError::NotFound)?;
        permissions.remove(pos);
        Ok(())
    }
    fn permissions_of(&self, scope: &PermissionScope) -> RepoResult<Vec<DataPermission>> {
        let mut permissions: Vec<_> = self
            .permissions
            .borrow()
            .iter()
            .filter(|(s, _)| s == scope)
            .map(|(_, p)| p.clone())
            .collect();
        permissions.sort_by_key(|p| p.priority);
        Ok(permissions)
    }
}

impl ApiKeyRepo for MockDb {
    fn create_api_key(&self, api_key: &ApiKey) -> RepoResult<()> {
        if self.api_keys.borrow().iter().any(|k| k.key == api_key.key) {
            return Err(RepoError::AlreadyExists);
        }
        create(&mut self.api_keys.borrow_mut(), api_key.clone())
    }
    fn update_api_key(&self, api_key: &ApiKey) -> RepoResult<()> {
        update(&mut self.api_keys.borrow_mut(), api_key)
    }
    fn get_api_key(&self, key: &str) -> RepoResult<ApiKey> {
        self.api_keys
            .borrow()
            .iter()
            .find(|k| k.key == key)
            .cloned()
            .ok_or(RepoError::NotFound)
    }
    fn api_keys_of_dataset(&self, dataset_id: &str) -> RepoResult<Vec<ApiKey>> {
        Ok(self
            .api_keys
            .borrow()
            .iter()
            .filter(|k| k.dataset_id == dataset_id)
            .cloned()
            .collect())
    }
}

impl GroupRepo for MockDb {
    fn create_group(&self, group: &Group) -> RepoResult<()> {
        if self
            .groups
            .borrow()
            .iter()
            .any(|g| g.dataset_id == group.dataset_id && g.name == group.name)
        {
            return Err(RepoError::AlreadyExists);
        }
        create(&mut self.groups.borrow_mut(), group.clone())
    }
    fn add_group_member(&self, group_id: &str, user_id: &str) -> RepoResult<()> {
        get(&self.groups.borrow(), group_id)?;
        let mut members = self.group_members.borrow_mut();
        if members
            .iter()
            .any(|(g, u)| g.as_str() == group_id && u.as_str() == user_id)
        {
            return Err(RepoError::AlreadyExists);
        }
        members.push((group_id.into(), user_id.into()));
        Ok(())
    }
    fn get_group(&self, id: &str) -> RepoResult<Group> {
        get(&self.groups.borrow(), id)
    }
    fn groups_of_dataset(&self, dataset_id: &str) -> RepoResult<Vec<Group>> {
        Ok(self
            .groups
            .borrow()
            .iter()
            .filter(|g| g.dataset_id == dataset_id)
            .cloned()
            .collect())
    }
    fn groups_of_user_in_dataset(&self, user_id: &str, dataset_id: &str) -> RepoResult<Vec<Group>> {
        let members = self.group_members.borrow();
        Ok(self
            .groups_of_dataset(dataset_id)?
            .into_iter()
            .filter(|g| members.iter().any(|(gid, uid)| *gid == g.id && uid.as_str() == user_id))
            .collect())
    }
    fn group_member_ids(&self, group_id: &str) -> RepoResult<Vec<Id>> {
        Ok(self
            .group_members
            .borrow()
            .iter()
            .filter(|(g, _)| g.as_str() == group_id)
            .map(|(_, u)| u.clone())
            .collect())
    }
}

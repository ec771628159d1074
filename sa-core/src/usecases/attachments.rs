use super::prelude::*;

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub thing_id : Id,
    pub name     : String,
    pub file     : String,
}

pub fn add_attachment<R>(repo: &R, dataset: &DataSet, new: NewAttachment) -> Result<Attachment>
where
    R: ThingRepo + AttachmentRepo,
{
    let NewAttachment {
        thing_id,
        name,
        file,
    } = new;
    let (thing, _) = repo.get_thing(thing_id.as_str())?;
    if thing.dataset_id != dataset.id {
        return Err(RepoError::NotFound.into());
    }
    let now = Timestamp::now();
    let attachment = Attachment {
        id: Id::new(),
        thing_id,
        name: name.trim().to_string(),
        file,
        created_at: now,
        updated_at: now,
    };
    repo.create_attachment(&attachment)?;
    log::info!("Attached '{}' to {}", attachment.name, attachment.thing_id);
    Ok(attachment)
}

pub fn delete_attachment<R: AttachmentRepo>(repo: &R, id: &str) -> Result<Attachment> {
    let attachment = repo.get_attachment(id)?;
    repo.delete_attachment(id)?;
    Ok(attachment)
}

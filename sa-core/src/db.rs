use crate::repositories::*;

pub trait Db:
    UserRepo
    + DataSetRepo
    + ThingRepo
    + PlaceRepo
    + SubmissionSetRepo
    + SubmissionRepo
    + AttachmentRepo
    + ActionRepo
    + DataIndexRepo
    + IndexedValueRepo
    + PermissionRepo
    + ApiKeyRepo
    + GroupRepo
{
}

impl<T> Db for T where
    T: UserRepo
        + DataSetRepo
        + ThingRepo
        + PlaceRepo
        + SubmissionSetRepo
        + SubmissionRepo
        + AttachmentRepo
        + ActionRepo
        + DataIndexRepo
        + IndexedValueRepo
        + PermissionRepo
        + ApiKeyRepo
        + GroupRepo
{
}

use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq)]
pub enum ObjectStorageError {
    #[error("Cannot list buckets: {raw_error_message:?}.")]
    CannotListBuckets { raw_error_message: String },
    #[error("Invalid bucket name error for `{bucket_name:?}`: {raw_error_message:?}.")]
    InvalidBucketName {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Bucket `{bucket_name:?}` already exists: {raw_error_message:?}.")]
    BucketAlreadyExists {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot create bucket error for `{bucket_name:?}`: {raw_error_message:?}.")]
    CannotCreateBucket {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot get bucket error for `{bucket_name:?}`: {raw_error_message:?}.")]
    CannotGetBucket {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot delete bucket error for `{bucket_name:?}`: {raw_error_message:?}.")]
    CannotDeleteBucket {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot empty bucket error for `{bucket_name:?}`: {raw_error_message:?}.")]
    CannotEmptyBucket {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot list objects error for `{bucket_name:?}`: {raw_error_message:?}.")]
    CannotListObjects {
        bucket_name: String,
        raw_error_message: String,
    },
    #[error("Cannot upload file `{file_name:?}` error for `{bucket_name:?}`: {raw_error_message:?}.")]
    CannotUploadFile {
        bucket_name: String,
        file_name: String,
        raw_error_message: String,
    },
}

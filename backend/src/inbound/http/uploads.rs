//! Multipart listing forms and the image type gate.
//!
//! Uploads are validated before anything touches the image store: both the
//! filename extension and the declared content type must name an accepted
//! image format. The temporary file backing an accepted upload stays owned
//! by the form until the store has copied it.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};

use crate::domain::ports::ImageUpload;
use crate::domain::{ALLOWED_IMAGE_TYPES, Error};

pub(crate) const IMAGE_TYPES_HINT: &str = "upload an image file (jpeg, jpg, png, gif)";

/// Multipart payload for creating a listing.
#[derive(Debug, MultipartForm)]
pub struct CreateListingForm {
    #[multipart(rename = "furnitureName")]
    pub furniture_name: Text<String>,
    pub price: Text<String>,
    pub image: TempFile,
}

/// Multipart payload for updating a listing. A submitted name is parsed
/// and discarded; listing names are immutable.
#[derive(Debug, MultipartForm)]
pub struct UpdateListingForm {
    #[multipart(rename = "furnitureName")]
    pub furniture_name: Option<Text<String>>,
    pub price: Text<String>,
    pub image: Option<TempFile>,
}

/// Browsers submit an empty file part when the file input is left blank;
/// treat those as no upload at all.
pub(crate) fn submitted_image(image: Option<&TempFile>) -> Option<&TempFile> {
    image.filter(|file| file.size > 0)
}

/// Run the type gate and describe the upload for the image store.
pub(crate) fn validate_image(file: &TempFile) -> Result<ImageUpload, Error> {
    let extension = file
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .filter(|extension| ALLOWED_IMAGE_TYPES.contains(&extension.as_str()))
        .ok_or_else(|| Error::upload_rejected(IMAGE_TYPES_HINT))?;

    let content_type_accepted = file.content_type.as_ref().is_some_and(|mime| {
        mime.type_().as_str().eq_ignore_ascii_case("image")
            && ALLOWED_IMAGE_TYPES
                .iter()
                .any(|allowed| mime.subtype().as_str().eq_ignore_ascii_case(allowed))
    });
    if !content_type_accepted {
        return Err(Error::upload_rejected(IMAGE_TYPES_HINT));
    }

    Ok(ImageUpload {
        source: file.file.path().to_path_buf(),
        extension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn upload(file_name: Option<&str>, content_type: Option<&str>, size: usize) -> TempFile {
        TempFile {
            file: NamedTempFile::new().expect("temp file"),
            content_type: content_type.and_then(|value| value.parse().ok()),
            file_name: file_name.map(str::to_owned),
            size,
        }
    }

    #[rstest]
    #[case("sofa.png", "image/png", "png")]
    #[case("sofa.PNG", "image/PNG", "png")]
    #[case("chair.jpg", "image/jpeg", "jpg")]
    #[case("chair.jpeg", "image/jpeg", "jpeg")]
    #[case("lamp.gif", "image/gif", "gif")]
    fn accepts_image_uploads(
        #[case] file_name: &str,
        #[case] content_type: &str,
        #[case] expected_extension: &str,
    ) {
        let file = upload(Some(file_name), Some(content_type), 4);
        let accepted = validate_image(&file).expect("accepted upload");
        assert_eq!(accepted.extension, expected_extension);
        assert_eq!(accepted.source, file.file.path());
    }

    #[rstest]
    #[case(Some("notes.txt"), Some("text/plain"))]
    #[case(Some("archive.pdf"), Some("application/pdf"))]
    #[case(Some("sofa.png"), Some("text/plain"))]
    #[case(Some("sofa.png"), Some("application/octet-stream"))]
    #[case(Some("sofa.png"), None)]
    #[case(Some("sofa"), Some("image/png"))]
    #[case(None, Some("image/png"))]
    fn rejects_non_image_uploads(
        #[case] file_name: Option<&str>,
        #[case] content_type: Option<&str>,
    ) {
        let file = upload(file_name, content_type, 4);
        let error = validate_image(&file).expect_err("rejected upload");
        assert_eq!(error.code, ErrorCode::UploadRejected);
        assert_eq!(error.message, IMAGE_TYPES_HINT);
    }

    #[rstest]
    fn empty_file_parts_count_as_no_upload() {
        let blank = upload(Some(""), None, 0);
        assert!(submitted_image(Some(&blank)).is_none());
        assert!(submitted_image(None).is_none());

        let present = upload(Some("sofa.png"), Some("image/png"), 4);
        assert!(submitted_image(Some(&present)).is_some());
    }
}

//! Multipart form reading shared by the book and profile routes

use crate::error::ApiError;
use crate::uploads::ImageUpload;
use axum::extract::multipart::{Multipart, MultipartError};
use bookshelf_shared::validation::{image_extension, ALLOWED_IMAGE_EXTENSIONS};
use std::collections::HashMap;

/// Text fields plus at most one image from a multipart body
#[derive(Debug, Default)]
pub struct UploadForm {
    text: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl UploadForm {
    pub fn take_text(&mut self, name: &str) -> Option<String> {
        self.text.remove(name)
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
}

/// Read every field; `image_field` names the file part.
///
/// A file part with neither a file name nor content counts as absent,
/// which is what browsers send for an untouched file input. A named file
/// with no content is a validation error.
pub async fn read_upload_form(
    mut multipart: Multipart,
    image_field: &str,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == image_field {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let body = field.bytes().await.map_err(multipart_error)?;
            if file_name.is_empty() && body.is_empty() {
                continue;
            }

            let extension = image_extension(&file_name).ok_or_else(|| {
                ApiError::Validation(format!(
                    "{} must be an image ({})",
                    image_field,
                    ALLOWED_IMAGE_EXTENSIONS.join(", ")
                ))
            })?;
            if body.is_empty() {
                return Err(ApiError::Validation(format!("{} is empty", image_field)));
            }

            form.image = Some(ImageUpload { extension, body });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.text.insert(name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};

    const BOUNDARY: &str = "forms-test-boundary";

    async fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Multipart {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            let disposition = match file_name {
                Some(file_name) => format!("name=\"{}\"; filename=\"{}\"", name, file_name),
                None => format!("name=\"{}\"", name),
            };
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; {disposition}\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .method("POST")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_reads_text_and_image() {
        let form = multipart(&[("name", None, "Dune"), ("image", Some("dune.PNG"), "PNG")]).await;
        let mut form = read_upload_form(form, "image").await.unwrap();

        assert_eq!(form.take_text("name").as_deref(), Some("Dune"));
        let image = form.image.unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(&image.body[..], b"PNG");
    }

    #[tokio::test]
    async fn test_untouched_file_input_is_absent() {
        let form = multipart(&[("bio", None, "hi"), ("avatar", Some(""), "")]).await;
        let form = read_upload_form(form, "avatar").await.unwrap();

        assert!(form.image.is_none());
    }

    #[tokio::test]
    async fn test_named_file_without_content_is_rejected() {
        let form = multipart(&[("avatar", Some("me.png"), "")]).await;
        let err = read_upload_form(form, "avatar").await.unwrap_err();

        assert!(matches!(err, ApiError::Validation(msg) if msg == "avatar is empty"));
    }

    #[tokio::test]
    async fn test_disallowed_extension_is_rejected() {
        let form = multipart(&[("image", Some("run.sh"), "#!/bin/sh")]).await;
        let err = read_upload_form(form, "image").await.unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
    }
}

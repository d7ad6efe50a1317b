//! Movie entity model and DTOs.
//!
//! The video location is stored as three columns (`video_source`,
//! `video_path`, `video_url`) with a check constraint that exactly one
//! location is set, and exposed as the tagged [`VideoDescriptor`].

use ott_core::enums::{MovieStatus, VideoSource};
use ott_core::repository::{Entity, FileSlot, MediaKind, Reference};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{Check, DefaultValue, FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// Where a movie's video lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum VideoDescriptor {
    /// An uploaded file under the upload directory.
    Upload { path: String },
    /// An external URL.
    Link { url: String },
}

impl VideoDescriptor {
    pub fn source(&self) -> VideoSource {
        match self {
            Self::Upload { .. } => VideoSource::Upload,
            Self::Link { .. } => VideoSource::Link,
        }
    }

    /// The stored file, if the video was uploaded.
    pub fn uploaded_path(&self) -> Option<&str> {
        match self {
            Self::Upload { path } => Some(path),
            Self::Link { .. } => None,
        }
    }

    /// The external URL, if the video is linked.
    pub fn link_url(&self) -> Option<&str> {
        match self {
            Self::Upload { .. } => None,
            Self::Link { url } => Some(url),
        }
    }
}

/// A row from the `movies` table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub video: VideoDescriptor,
    pub status: MovieStatus,
    pub category_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for Movie {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let source: String = row.try_get("video_source")?;
        let source = source.parse::<VideoSource>().map_err(|e| decode_error("video_source", e))?;
        let video = match source {
            VideoSource::Upload => VideoDescriptor::Upload {
                path: row.try_get("video_path")?,
            },
            VideoSource::Link => VideoDescriptor::Link {
                url: row.try_get("video_url")?,
            },
        };
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            video,
            status: status.parse::<MovieStatus>().map_err(|e| decode_error("status", e))?,
            category_id: row.try_get("category_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn decode_error(column: &str, err: ott_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}

/// Flat create DTO as produced by the validator; `video_path` is only set
/// for uploads and `video_url` only for links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovie {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub video_source: VideoSource,
    pub video_path: Option<String>,
    pub video_url: Option<String>,
    pub status: MovieStatus,
    pub category_id: DbId,
}

impl CreateMovie {
    pub fn video(&self) -> VideoDescriptor {
        match self.video_source {
            VideoSource::Upload => VideoDescriptor::Upload {
                path: self.video_path.clone().unwrap_or_default(),
            },
            VideoSource::Link => VideoDescriptor::Link {
                url: self.video_url.clone().unwrap_or_default(),
            },
        }
    }
}

/// Partial update. The video columns change only when `video_source` is
/// restated together with the matching location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovie {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_source: Option<VideoSource>,
    pub video_path: Option<String>,
    pub video_url: Option<String>,
    pub status: Option<MovieStatus>,
    pub category_id: Option<DbId>,
}

impl UpdateMovie {
    /// The replacement video, if this patch sets one.
    pub fn video(&self) -> Option<VideoDescriptor> {
        match self.video_source? {
            VideoSource::Upload => self
                .video_path
                .clone()
                .map(|path| VideoDescriptor::Upload { path }),
            VideoSource::Link => self.video_url.clone().map(|url| VideoDescriptor::Link { url }),
        }
    }
}

pub static MOVIE_SCHEMA: Schema = Schema::new(
    "Movie",
    &[
        FieldRule::required("name", FieldKind::Text),
        FieldRule::required("description", FieldKind::Text),
        FieldRule::required("imageUrl", FieldKind::Text),
        FieldRule::required("videoSource", FieldKind::Text)
            .checks(&[Check::OneOf(VideoSource::VALUES)]),
        FieldRule::when("videoPath", FieldKind::Text, "videoSource", "UPLOAD"),
        FieldRule::when("videoUrl", FieldKind::Text, "videoSource", "LINK").checks(&[Check::Url]),
        FieldRule::optional("status", FieldKind::Text)
            .checks(&[Check::OneOf(MovieStatus::VALUES)])
            .default_to(DefaultValue::Text("PENDING")),
        FieldRule::required("categoryId", FieldKind::Id),
    ],
);

impl Entity for Movie {
    type Create = CreateMovie;
    type Update = UpdateMovie;

    const NAME: &'static str = "Movie";
    const LABEL: &'static str = "Movie";
    const PLURAL: &'static str = "Movies";
    const COUNT_KEY: &'static str = "totalMovies";
    const FILE_SLOTS: &'static [FileSlot] = &[
        FileSlot::single("image", "imageUrl", MediaKind::Image),
        FileSlot::single("movie", "videoPath", MediaKind::Video),
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description"];
    const FILTER_FIELDS: &'static [&'static str] = &["status", "categoryId"];
    const REFERENCES: &'static [Reference] = &[Reference {
        field: "categoryId",
        entity: "Category",
        table: "categories",
    }];

    fn schema() -> &'static Schema {
        &MOVIE_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }

    fn artifacts(&self) -> Vec<String> {
        let mut paths = vec![self.image_url.clone()];
        paths.extend(self.video.uploaded_path().map(str::to_owned));
        paths
    }
}

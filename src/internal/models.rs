use serde::Deserialize;

/// An image variant attached to an idea by the API's `append[]` mechanism.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Idea {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub small_image: Option<Image>,
    #[serde(default)]
    pub medium_image: Option<Image>,
}

impl Idea {
    /// Display image: small variant, falling back to medium.
    pub fn image_url(&self) -> Option<&str> {
        self.small_image
            .as_ref()
            .or(self.medium_image.as_ref())
            .map(|img| img.url.as_str())
    }
}

/// One fetched page of ideas plus the collection-wide total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdeaPage {
    pub items: Vec<Idea>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use longevity_curator::contract::{
    FetchedImage, MockImageFetcher, MockImageSearch, MockNewsProvider, MockPublisher,
    MockSocialProvider, MockSourcePicker,
};
use longevity_curator::{Collaborators, Platform};

/// A tiny valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Rgb([10, 200, 30]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn ok_image() -> FetchedImage {
    FetchedImage {
        status: 200,
        bytes: png_bytes(),
    }
}

/// True when the file decodes as an image, whatever its extension says.
pub fn is_valid_image(path: &Path) -> bool {
    match std::fs::read(path) {
        Ok(bytes) => image::load_from_memory(&bytes).is_ok(),
        Err(_) => false,
    }
}

/// True when the file holds JPEG bytes.
pub fn is_jpeg(path: &Path) -> bool {
    match std::fs::read(path) {
        Ok(bytes) => matches!(image::guess_format(&bytes), Ok(ImageFormat::Jpeg)),
        Err(_) => false,
    }
}

/// A collaborator table where every mock is left without expectations;
/// any unexpected call panics inside the mock.
pub struct Mocks {
    pub news: MockNewsProvider,
    pub social: MockSocialProvider,
    pub image_search: MockImageSearch,
    pub image_fetcher: MockImageFetcher,
    pub picker: MockSourcePicker,
    pub platforms: Vec<Platform>,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            news: MockNewsProvider::new(),
            social: MockSocialProvider::new(),
            image_search: MockImageSearch::new(),
            image_fetcher: MockImageFetcher::new(),
            picker: MockSourcePicker::new(),
            platforms: Vec::new(),
        }
    }

    pub fn with_platform(mut self, name: &str, publisher: MockPublisher) -> Self {
        self.platforms.push(Platform::new(name, Box::new(publisher)));
        self
    }

    pub fn into_collaborators(self) -> Collaborators {
        Collaborators {
            news: Box::new(self.news),
            social: Box::new(self.social),
            image_search: Box::new(self.image_search),
            image_fetcher: Box::new(self.image_fetcher),
            picker: Box::new(self.picker),
            platforms: self.platforms,
        }
    }
}

pub fn publisher_ok(times: usize) -> MockPublisher {
    let mut p = MockPublisher::new();
    p.expect_publish().times(times).returning(|_, _| Ok(()));
    p
}

pub fn publisher_err(times: usize, msg: &'static str) -> MockPublisher {
    let mut p = MockPublisher::new();
    p.expect_publish()
        .times(times)
        .returning(move |_, _| Err(msg.into()));
    p
}

pub fn publisher_never() -> MockPublisher {
    let mut p = MockPublisher::new();
    p.expect_publish().never();
    p
}

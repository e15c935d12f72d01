mod common;

use std::path::PathBuf;

use common::{is_valid_image, ok_image, publisher_err, publisher_never, publisher_ok, Mocks};
use longevity_curator::contract::{ArticleSource, MockPublisher, NewsArticle, SocialPost};
use longevity_curator::{
    Blocklist, ContentKind, Curator, ImageTier, PostMode, RunConfig, RunOutcome, RunState,
};
use mockall::predicate::eq;
use tempfile::{tempdir, TempDir};

fn article() -> NewsArticle {
    NewsArticle {
        title: Some("Sleep Study Finds Link".into()),
        url: Some("https://ex.co/a".into()),
        url_to_image: Some("https://img.ex.co/a.png".into()),
        source: Some(ArticleSource {
            name: Some("HealthDaily".into()),
        }),
    }
}

fn post() -> SocialPost {
    SocialPost {
        title: Some("Zone 2 cardio changed my bloodwork".into()),
        url: Some("https://reddit.com/r/Longevity/comments/x".into()),
        image_url: None,
        score: 900,
    }
}

fn config(dir: &TempDir, mode: PostMode) -> RunConfig {
    RunConfig {
        mode,
        image_path: dir.path().join("image.jpg"),
        ..RunConfig::default()
    }
}

#[tokio::test]
async fn news_run_publishes_to_every_platform() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new()
        .with_platform("Twitter/X", publisher_ok(1))
        .with_platform("Instagram", publisher_err(1, "media container rejected"))
        .with_platform("Facebook", publisher_ok(1))
        .with_platform("Bluesky", publisher_ok(1));
    mocks
        .news
        .expect_fetch_news_article()
        .times(1)
        .returning(|| Ok(Some(article())));
    mocks.social.expect_fetch_social_post().never();
    mocks
        .image_fetcher
        .expect_fetch_image()
        .with(eq("https://img.ex.co/a.png"))
        .times(1)
        .returning(|_| Ok(ok_image()));
    mocks.image_search.expect_search_image().never();

    let curator = Curator::new(config(&dir, PostMode::News), mocks.into_collaborators());
    let report = curator.run_once().await;

    match report.outcome {
        RunOutcome::Published {
            kind,
            title,
            image_tier,
            results,
            succeeded,
            total,
        } => {
            assert_eq!(kind, ContentKind::News);
            assert_eq!(title, "Sleep Study Finds Link");
            assert_eq!(image_tier, ImageTier::Direct);
            assert_eq!(results.len(), 4);
            assert_eq!((succeeded, total), (3, 4));
        }
        other => panic!("expected Published, got {other:?}"),
    }
    assert!(is_valid_image(&dir.path().join("image.jpg")));
}

#[tokio::test]
async fn blocked_news_falls_back_to_social() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new().with_platform("Bluesky", publisher_ok(1));
    mocks.news.expect_fetch_news_article().times(1).returning(|| {
        Ok(Some(NewsArticle {
            title: Some("The KETO miracle".into()),
            ..article()
        }))
    });
    mocks
        .social
        .expect_fetch_social_post()
        .times(1)
        .returning(|| Ok(Some(post())));
    mocks.image_fetcher.expect_fetch_image().never();
    mocks
        .image_search
        .expect_search_image()
        .with(eq("health longevity"))
        .times(1)
        .returning(|_| Ok(None));

    let cfg = RunConfig {
        blocklist: Blocklist::from_csv("", "keto"),
        ..config(&dir, PostMode::News)
    };
    let report = Curator::new(cfg, mocks.into_collaborators()).run_once().await;

    match report.outcome {
        RunOutcome::Published {
            kind, image_tier, ..
        } => {
            assert_eq!(kind, ContentKind::SocialPost);
            assert_eq!(image_tier, ImageTier::Placeholder);
        }
        other => panic!("expected Published, got {other:?}"),
    }
}

#[tokio::test]
async fn both_kinds_blocked_is_no_content() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new().with_platform("Twitter/X", publisher_never());
    mocks
        .news
        .expect_fetch_news_article()
        .times(1)
        .returning(|| Ok(Some(article())));
    mocks
        .social
        .expect_fetch_social_post()
        .times(1)
        .returning(|| Ok(Some(post())));
    mocks.image_fetcher.expect_fetch_image().never();
    mocks.image_search.expect_search_image().never();

    let cfg = RunConfig {
        blocklist: Blocklist::from_csv("ex.co,reddit.com", ""),
        ..config(&dir, PostMode::News)
    };
    let report = Curator::new(cfg, mocks.into_collaborators()).run_once().await;

    assert_eq!(report.outcome, RunOutcome::NoContent);
    assert!(!dir.path().join("image.jpg").exists());
}

#[tokio::test]
async fn provider_error_counts_as_absence() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new().with_platform("Facebook", publisher_ok(1));
    mocks
        .social
        .expect_fetch_social_post()
        .times(1)
        .returning(|| Err("reddit returned 503".into()));
    mocks
        .news
        .expect_fetch_news_article()
        .times(1)
        .returning(|| Ok(Some(article())));
    mocks
        .image_fetcher
        .expect_fetch_image()
        .returning(|_| Ok(ok_image()));

    let report = Curator::new(config(&dir, PostMode::Social), mocks.into_collaborators())
        .run_once()
        .await;

    assert!(matches!(
        report.outcome,
        RunOutcome::Published {
            kind: ContentKind::News,
            succeeded: 1,
            total: 1,
            ..
        }
    ));
}

#[tokio::test]
async fn auto_mode_asks_the_picker() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new();
    mocks
        .picker
        .expect_pick()
        .times(1)
        .return_const(ContentKind::SocialPost);
    mocks.news.expect_fetch_news_article().never();
    mocks
        .social
        .expect_fetch_social_post()
        .times(1)
        .returning(|| Ok(Some(post())));
    mocks.image_search.expect_search_image().returning(|_| Ok(None));

    let report = Curator::new(config(&dir, PostMode::Auto), mocks.into_collaborators())
        .run_once()
        .await;

    assert!(matches!(
        report.outcome,
        RunOutcome::Published {
            kind: ContentKind::SocialPost,
            total: 0,
            ..
        }
    ));
}

#[tokio::test]
async fn dry_run_reports_without_publishing() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new()
        .with_platform("Twitter/X", publisher_never())
        .with_platform("Instagram", publisher_never())
        .with_platform("Facebook", publisher_never())
        .with_platform("Bluesky", publisher_never());
    mocks
        .news
        .expect_fetch_news_article()
        .returning(|| Ok(Some(article())));
    mocks
        .image_fetcher
        .expect_fetch_image()
        .returning(|_| Ok(ok_image()));

    let cfg = RunConfig {
        dry_run: true,
        ..config(&dir, PostMode::News)
    };
    let report = Curator::new(cfg, mocks.into_collaborators()).run_once().await;

    match report.outcome {
        RunOutcome::DryRun {
            caption,
            image_path,
            results,
            ..
        } => {
            assert!(caption.starts_with("📰 Sleep Study Finds Link — HealthDaily"));
            assert!(caption.ends_with("https://ex.co/a"));
            assert_eq!(image_path, dir.path().join("image.jpg"));
            assert_eq!(results.len(), 4);
            assert!(results.iter().all(|r| r.dry_run));
        }
        other => panic!("expected DryRun, got {other:?}"),
    }
    assert!(is_valid_image(&dir.path().join("image.jpg")));
}

#[tokio::test]
async fn panicking_provider_aborts_the_run() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new().with_platform("Twitter/X", publisher_never());
    mocks
        .news
        .expect_fetch_news_article()
        .returning(|| panic!("malformed provider payload"));
    mocks.social.expect_fetch_social_post().never();

    let report = Curator::new(config(&dir, PostMode::News), mocks.into_collaborators())
        .run_once()
        .await;

    match report.outcome {
        RunOutcome::Aborted { state, reason } => {
            assert_eq!(state, RunState::SelectingContent);
            assert!(reason.contains("malformed provider payload"));
        }
        other => panic!("expected Aborted, got {other:?}"),
    }
}

#[tokio::test]
async fn unwritable_image_location_aborts_before_publishing() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let mut mocks = Mocks::new().with_platform("Bluesky", publisher_never());
    mocks
        .news
        .expect_fetch_news_article()
        .returning(|| Ok(Some(article())));

    let cfg = RunConfig {
        mode: PostMode::News,
        image_path: PathBuf::from(&blocker).join("image.jpg"),
        ..RunConfig::default()
    };
    let report = Curator::new(cfg, mocks.into_collaborators()).run_once().await;

    assert!(matches!(
        report.outcome,
        RunOutcome::Aborted {
            state: RunState::ResolvingImage,
            ..
        }
    ));
}

#[tokio::test]
async fn each_run_gets_its_own_id() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new();
    mocks.news.expect_fetch_news_article().returning(|| Ok(None));
    mocks.social.expect_fetch_social_post().returning(|| Ok(None));

    let curator = Curator::new(config(&dir, PostMode::News), mocks.into_collaborators());
    let first = curator.run_once().await;
    let second = curator.run_once().await;

    assert_eq!(first.outcome, RunOutcome::NoContent);
    assert_eq!(second.outcome, RunOutcome::NoContent);
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn post_mode_parses_aliases() {
    assert_eq!("NEWS".parse::<PostMode>(), Ok(PostMode::News));
    assert_eq!("reddit".parse::<PostMode>(), Ok(PostMode::Social));
    assert_eq!(" auto ".parse::<PostMode>(), Ok(PostMode::Auto));
    assert!("tiktok".parse::<PostMode>().is_err());
}

#[tokio::test]
async fn panicking_publisher_does_not_abort_the_run() {
    let dir = tempdir().unwrap();
    let mut panicking = MockPublisher::new();
    panicking
        .expect_publish()
        .times(1)
        .returning(|_, _| panic!("sdk bug"));
    let mut mocks = Mocks::new()
        .with_platform("Twitter/X", publisher_ok(1))
        .with_platform("Instagram", panicking)
        .with_platform("Facebook", publisher_ok(1))
        .with_platform("Bluesky", publisher_ok(1));
    mocks
        .news
        .expect_fetch_news_article()
        .returning(|| Ok(Some(article())));
    mocks
        .image_fetcher
        .expect_fetch_image()
        .returning(|_| Ok(ok_image()));

    let report = Curator::new(config(&dir, PostMode::News), mocks.into_collaborators())
        .run_once()
        .await;

    match report.outcome {
        RunOutcome::Published {
            results,
            succeeded,
            total,
            ..
        } => {
            assert_eq!(results.len(), 4);
            assert!(!results[1].succeeded);
            assert_eq!((succeeded, total), (3, 4));
        }
        other => panic!("expected Published, got {other:?}"),
    }
}

#[tokio::test]
async fn bare_article_with_failing_search_gets_generated_card() {
    let dir = tempdir().unwrap();
    let mut mocks = Mocks::new().with_platform("Bluesky", publisher_ok(1));
    mocks
        .news
        .expect_fetch_news_article()
        .times(1)
        .returning(|| Ok(Some(NewsArticle::default())));
    mocks.image_fetcher.expect_fetch_image().never();
    mocks
        .image_search
        .expect_search_image()
        .with(eq("health longevity wellness"))
        .times(1)
        .returning(|_| Err("search service unreachable".into()));

    let report = Curator::new(config(&dir, PostMode::News), mocks.into_collaborators())
        .run_once()
        .await;

    match report.outcome {
        RunOutcome::Published {
            title, image_tier, ..
        } => {
            assert_eq!(title, "Interesting health article");
            assert_eq!(image_tier, ImageTier::Placeholder);
        }
        other => panic!("expected Published, got {other:?}"),
    }
    let bytes = std::fs::read(dir.path().join("image.jpg")).unwrap();
    let img = image::load_from_memory(&bytes).expect("decodable card");
    assert_eq!((img.width(), img.height()), (1200, 675));
}

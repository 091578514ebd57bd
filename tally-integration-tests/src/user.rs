use tally::{eyre, Definition, TestFactory, TestRunner, UnitTest};

use crate::api::User;

const USERNAME: &str = "crew";

#[tally::test(name = "Load Single User by Username", timeout = 1000)]
async fn load_single_user(t: UnitTest) -> eyre::Result<()> {
    let user = User::load_by_username(USERNAME).await?;
    t.assert(user.username == USERNAME, "is same user as requested one")
        .await?;
    t.assert(!user.name.is_empty(), "has a display name").await?;
    Ok(())
}

#[tally::test(name = "Load User Photos", timeout = 1000)]
async fn load_user_photos(t: UnitTest) -> eyre::Result<()> {
    let user = User::load_by_username(USERNAME).await?;
    let photos = user.load_photos().await?;
    t.assert(!photos.is_empty(), "user has photos").await?;
    t.assert(
        photos.iter().all(|photo| photo.id.starts_with(USERNAME)),
        "photos belong to the user",
    )
    .await?;
    t.assert(
        photos.iter().all(|photo| photo.width > 0 && photo.height > 0),
        "photos have dimensions",
    )
    .await?;
    Ok(())
}

#[tally::test(name = "Unknown User Is Rejected")]
async fn unknown_user(t: UnitTest) -> eyre::Result<()> {
    let result = User::load_by_username("nobody").await;
    t.assert(result.is_err(), "loading fails").await?;
    Ok(())
}

pub fn runner() -> TestFactory {
    TestRunner::runs(
        Definition::new("User Test Runner"),
        [load_single_user(), load_user_photos(), unknown_user()],
    )
}

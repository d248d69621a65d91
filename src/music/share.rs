use super::normalize::title_to_slug;
use super::Music;
use serde::Serialize;

/// Everything a client needs to offer sharing a catalog entry.
/// Opening the links is left to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub url: String,
    pub subject: String,
    pub body: String,
    pub mailto: String,
    pub facebook_url: String,
    pub twitter_url: String,
}

impl SharePayload {
    pub fn for_music(music: &Music, base_url: &str) -> SharePayload {
        let url = format!(
            "{}/music/{}",
            base_url.trim_end_matches('/'),
            title_to_slug(&music.title)
        );
        let subject = format!("Check out this piece of music: {}", music.title);
        let body = format!("I thought you might enjoy this piece of music: {}", url);

        let mailto = format!(
            "mailto:?subject={}&body={}",
            urlencoding::encode(&subject),
            urlencoding::encode(&body)
        );
        let facebook_url = format!(
            "https://www.facebook.com/sharer/sharer.php?u={}&quote={}",
            urlencoding::encode(&url),
            urlencoding::encode(&subject)
        );
        let twitter_url = format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            urlencoding::encode(&subject),
            urlencoding::encode(&url)
        );

        SharePayload {
            url,
            subject,
            body,
            mailto,
            facebook_url,
            twitter_url,
        }
    }
}

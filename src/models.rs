//! Data models
//!
//! Field-for-field mappings of the JSON objects inside each response's
//! `data` array. Unknown fields are ignored and missing ones fall back to
//! their defaults, so a model never fails on an extra or absent column.
//! Free-text fields the API may send as `null` are `Option`s.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::resource::ResourceKind;

/// Binds a model type to the resource it is fetched from
pub trait ApiResource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub id: i64,
    #[serde(rename = "artist")]
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attendance {
    #[serde(rename = "uid")]
    pub user_id: i64,
    pub username: String,
    #[serde(rename = "showid")]
    pub show_id: i64,
    #[serde(rename = "showyear")]
    pub show_year: String,
    #[serde(rename = "showmonth")]
    pub show_month: i32,
    #[serde(rename = "showday")]
    pub show_day: i32,
    #[serde(rename = "showdate")]
    pub show_date: String,
    pub permalink: Option<String>,
    pub exclude_from_stats: i32,
    #[serde(rename = "venueid")]
    pub venue_id: Option<i64>,
    pub setlist_notes: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "artistid")]
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    #[serde(rename = "tourid")]
    pub tour_id: Option<i64>,
    pub tour_name: Option<String>,
}

/// One row of a jam chart: a notable performance of a song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JamChartEntry {
    #[serde(rename = "showid")]
    pub show_id: i64,
    #[serde(rename = "showdate")]
    pub show_date: String,
    pub permalink: Option<String>,
    #[serde(rename = "songid")]
    pub song_id: i64,
    pub song: String,
    pub slug: String,
    pub set: Option<String>,
    pub position: i32,
    #[serde(rename = "jamchart_description")]
    pub description: Option<String>,
    #[serde(rename = "tracktime")]
    pub track_time: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub artist_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    #[serde(rename = "reviewid")]
    pub id: i64,
    #[serde(rename = "uid")]
    pub user_id: i64,
    pub username: String,
    pub review_text: Option<String>,
    pub posted_at: Option<String>,
    pub score: i32,
    #[serde(rename = "showid")]
    pub show_id: i64,
    #[serde(rename = "showdate")]
    pub show_date: String,
    #[serde(rename = "showyear")]
    pub show_year: String,
    pub permalink: Option<String>,
    #[serde(rename = "artistid")]
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// One song performance within a show's setlist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetlistItem {
    #[serde(rename = "showid")]
    pub show_id: i64,
    #[serde(rename = "showdate")]
    pub show_date: String,
    pub permalink: Option<String>,
    #[serde(rename = "showyear")]
    pub show_year: String,
    #[serde(rename = "uniqueid")]
    pub unique_id: i64,
    pub meta: Option<String>,
    pub reviews: i32,
    pub exclude: i32,
    #[serde(rename = "setlistnotes")]
    pub setlist_notes: Option<String>,
    pub soundcheck: Option<String>,
    #[serde(rename = "songid")]
    pub song_id: i64,
    pub position: i32,
    pub transition: i32,
    pub footnote: Option<String>,
    pub set: Option<String>,
    #[serde(rename = "isjam")]
    pub is_jam: i32,
    #[serde(rename = "isreprise")]
    pub is_reprise: i32,
    #[serde(rename = "isjamchart")]
    pub is_jam_chart: i32,
    #[serde(rename = "jamchart_description")]
    pub jam_chart_description: Option<String>,
    #[serde(rename = "tracktime")]
    pub track_time: Option<String>,
    pub gap: i32,
    #[serde(rename = "tourid")]
    pub tour_id: Option<i64>,
    #[serde(rename = "tourname")]
    pub tour_name: Option<String>,
    #[serde(rename = "tourwhen")]
    pub tour_when: Option<String>,
    pub song: String,
    pub nickname: Option<String>,
    pub slug: String,
    pub is_original: i32,
    #[serde(rename = "venueid")]
    pub venue_id: Option<i64>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub trans_mark: Option<String>,
    #[serde(rename = "artistid")]
    pub artist_id: Option<i64>,
    pub artist_slug: Option<String>,
    pub artist_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Show {
    #[serde(rename = "showid")]
    pub id: i64,
    #[serde(rename = "showyear")]
    pub show_year: String,
    #[serde(rename = "showmonth")]
    pub show_month: i32,
    #[serde(rename = "showday")]
    pub show_day: i32,
    #[serde(rename = "showdate")]
    pub show_date: String,
    pub permalink: Option<String>,
    pub exclude_from_stats: i32,
    #[serde(rename = "venueid")]
    pub venue_id: Option<i64>,
    pub setlist_notes: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "artistid")]
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    #[serde(rename = "tourid")]
    pub tour_id: Option<i64>,
    pub tour_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Long-form text about a song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongData {
    #[serde(rename = "songid")]
    pub song_id: i64,
    #[serde(rename = "song")]
    pub name: String,
    pub nickname: Option<String>,
    pub slug: String,
    pub lyrics: Option<String>,
    pub history: Option<String>,
    pub historian: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    #[serde(rename = "songid")]
    pub id: i64,
    #[serde(rename = "song")]
    pub name: String,
    pub slug: String,
    pub abbr: Option<String>,
    pub artist: Option<String>,
    pub debut: Option<String>,
    pub last_played: Option<String>,
    pub times_played: i64,
    pub last_permalink: Option<String>,
    pub debut_permalink: Option<String>,
    pub gap: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "uid")]
    pub id: i64,
    pub username: String,
    pub date_joined: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Venue {
    #[serde(rename = "venueid")]
    pub id: i64,
    #[serde(rename = "venuename")]
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "venuenotes")]
    pub notes: Option<String>,
    pub alias: i64,
    pub short_name: Option<String>,
}

macro_rules! api_resource {
    ($($model:ty => $kind:ident),+ $(,)?) => {
        $(
            impl ApiResource for $model {
                const KIND: ResourceKind = ResourceKind::$kind;
            }
        )+
    };
}

api_resource! {
    Artist => Artists,
    Attendance => Attendance,
    JamChartEntry => JamCharts,
    Review => Reviews,
    SetlistItem => Setlists,
    Show => Shows,
    SongData => SongData,
    Song => Songs,
    User => Users,
    Venue => Venues,
}

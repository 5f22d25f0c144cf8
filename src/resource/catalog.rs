//! Resource Catalog
//!
//! The fixed set of Phish.net resources and which query styles each of
//! them answers. The table is static: the API surface is closed, so a
//! compile-time list replaces any runtime discovery.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the ten resources exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Artists,
    Attendance,
    JamCharts,
    Reviews,
    Setlists,
    Shows,
    SongData,
    Songs,
    Users,
    Venues,
}

impl ResourceKind {
    /// Every resource, in path-name order
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Artists,
        ResourceKind::Attendance,
        ResourceKind::JamCharts,
        ResourceKind::Reviews,
        ResourceKind::Setlists,
        ResourceKind::Shows,
        ResourceKind::SongData,
        ResourceKind::Songs,
        ResourceKind::Users,
        ResourceKind::Venues,
    ];

    /// Lower-case name used in URL paths and cache file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Attendance => "attendance",
            Self::JamCharts => "jamcharts",
            Self::Reviews => "reviews",
            Self::Setlists => "setlists",
            Self::Shows => "shows",
            Self::SongData => "songdata",
            Self::Songs => "songs",
            Self::Users => "users",
            Self::Venues => "venues",
        }
    }

    /// Catalog entry for this resource
    pub fn def(&self) -> &'static ResourceDef {
        get_resource(*self)
    }

    /// Whether the resource answers `style` at all
    pub fn supports_style(&self, style: QueryStyle) -> bool {
        self.def().styles.contains(&style)
    }

    /// Listable resources answer both "all" and "by id" lookups
    pub fn is_listable(&self) -> bool {
        self.supports_style(QueryStyle::AllResources)
    }

    /// Queryable resources answer column lookups
    pub fn is_queryable(&self) -> bool {
        self.supports_style(QueryStyle::QueryByColumn)
    }

    /// Whether `column` may be used to query this resource
    pub fn supports_column(&self, column: QueryableColumn) -> bool {
        self.def().columns.contains(&column)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::configuration(format!("Invalid resource '{}'", s)))
    }
}

/// Shape of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStyle {
    AllResources,
    ResourceById,
    QueryByColumn,
}

impl fmt::Display for QueryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AllResources => "all",
            Self::ResourceById => "by id",
            Self::QueryByColumn => "by column",
        };
        f.write_str(name)
    }
}

/// Column a queryable resource can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryableColumn {
    Uid,
    Username,
    ShowId,
    ShowDate,
    Slug,
}

impl QueryableColumn {
    pub const ALL: [QueryableColumn; 5] = [
        QueryableColumn::Uid,
        QueryableColumn::Username,
        QueryableColumn::ShowId,
        QueryableColumn::ShowDate,
        QueryableColumn::Slug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uid => "uid",
            Self::Username => "username",
            Self::ShowId => "showid",
            Self::ShowDate => "showdate",
            Self::Slug => "slug",
        }
    }

    /// Type a value must have to be used with this column
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Uid | Self::ShowId => ValueKind::Integer,
            Self::Username | Self::Slug => ValueKind::Text,
            Self::ShowDate => ValueKind::Date,
        }
    }
}

impl fmt::Display for QueryableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryableColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        QueryableColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == wanted)
            .ok_or_else(|| Error::configuration(format!("Invalid query column '{}'", s)))
    }
}

/// Type tag of a query value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Text,
    Date,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Date => "date",
        };
        f.write_str(name)
    }
}

/// Sort order for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Static description of one resource
#[derive(Debug)]
pub struct ResourceDef {
    pub kind: ResourceKind,
    pub display_name: &'static str,
    pub styles: &'static [QueryStyle],
    pub columns: &'static [QueryableColumn],
    /// Column lookups return at most one logical item (users)
    pub single_by_column: bool,
}

const LISTABLE: &[QueryStyle] = &[QueryStyle::AllResources, QueryStyle::ResourceById];
const QUERYABLE: &[QueryStyle] = &[QueryStyle::QueryByColumn];

const USER_COLUMNS: &[QueryableColumn] = &[QueryableColumn::Uid, QueryableColumn::Username];
const SHOW_COLUMNS: &[QueryableColumn] = &[
    QueryableColumn::Uid,
    QueryableColumn::Username,
    QueryableColumn::ShowId,
    QueryableColumn::ShowDate,
];
const SONG_COLUMNS: &[QueryableColumn] = &[
    QueryableColumn::Slug,
    QueryableColumn::ShowId,
    QueryableColumn::ShowDate,
];

/// The catalog, one entry per [`ResourceKind`] in `ResourceKind::ALL` order
static REGISTRY: [ResourceDef; 10] = [
    ResourceDef {
        kind: ResourceKind::Artists,
        display_name: "Artists",
        styles: LISTABLE,
        columns: &[],
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::Attendance,
        display_name: "Attendance",
        styles: QUERYABLE,
        columns: SHOW_COLUMNS,
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::JamCharts,
        display_name: "Jam Charts",
        styles: QUERYABLE,
        columns: SONG_COLUMNS,
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::Reviews,
        display_name: "Reviews",
        styles: QUERYABLE,
        columns: SHOW_COLUMNS,
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::Setlists,
        display_name: "Setlists",
        styles: QUERYABLE,
        columns: SONG_COLUMNS,
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::Shows,
        display_name: "Shows",
        styles: LISTABLE,
        columns: &[],
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::SongData,
        display_name: "Song Data",
        styles: LISTABLE,
        columns: &[],
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::Songs,
        display_name: "Songs",
        styles: LISTABLE,
        columns: &[],
        single_by_column: false,
    },
    ResourceDef {
        kind: ResourceKind::Users,
        display_name: "Users",
        styles: QUERYABLE,
        columns: USER_COLUMNS,
        single_by_column: true,
    },
    ResourceDef {
        kind: ResourceKind::Venues,
        display_name: "Venues",
        styles: LISTABLE,
        columns: &[],
        single_by_column: false,
    },
];

/// Get the whole resource catalog
pub fn get_registry() -> &'static [ResourceDef] {
    &REGISTRY
}

/// Get the catalog entry for a resource
pub fn get_resource(kind: ResourceKind) -> &'static ResourceDef {
    let def = &REGISTRY[kind as usize];
    debug_assert_eq!(def.kind, kind, "catalog out of order");
    def
}

/// Get all resource path names (for help output)
pub fn get_all_resource_keys() -> Vec<&'static str> {
    REGISTRY.iter().map(|def| def.kind.as_str()).collect()
}

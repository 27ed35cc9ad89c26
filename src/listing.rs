//! Sorted, filtered view of the piece list.
//!
//! Rows keep the index of the piece in the store, so edit and delete act on
//! the right piece whatever the current ordering.

use std::cmp::Ordering;

use crate::model::{Group, Piece};

/// Shown when there are no pieces at all.
pub const EMPTY_LISTING_MESSAGE: &str = "Nenhuma peça adicionada ainda.";

/// Label of the "no filter" group option.
pub const ALL_GROUPS_LABEL: &str = "Todos os espaços";

/// Asked before a piece is deleted.
pub const DELETE_CONFIRMATION: &str = "Tem certeza que deseja excluir esta peça?";

/// Column a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Group,
    Quantity,
    Width,
    Height,
    UnitPrice,
    Area,
    TotalValue,
    CreatedAt,
}

impl SortField {
    /// Every field, in table column order.
    pub const ALL: [SortField; 8] = [
        SortField::Group,
        SortField::Quantity,
        SortField::Width,
        SortField::Height,
        SortField::UnitPrice,
        SortField::Area,
        SortField::TotalValue,
        SortField::CreatedAt,
    ];

    /// Field name as used in the persisted piece JSON.
    pub fn key(&self) -> &'static str {
        match self {
            SortField::Group => "group",
            SortField::Quantity => "quantity",
            SortField::Width => "width",
            SortField::Height => "height",
            SortField::UnitPrice => "unitPrice",
            SortField::Area => "area",
            SortField::TotalValue => "totalValue",
            SortField::CreatedAt => "createdAt",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Column header text, for the sortable columns shown in the table.
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Group => "Espaço",
            SortField::Quantity => "Qtde",
            SortField::Width => "Largura",
            SortField::Height => "Altura",
            SortField::UnitPrice => "Preço Unitário",
            SortField::Area => "Área",
            SortField::TotalValue => "Valor",
            SortField::CreatedAt => "Criado em",
        }
    }

    fn compare(&self, a: &Piece, b: &Piece) -> Ordering {
        match self {
            SortField::Group => compare_text(a.group(), b.group()),
            SortField::Quantity => a.quantity().cmp(&b.quantity()),
            SortField::Width => a.width().total_cmp(&b.width()),
            SortField::Height => a.height().total_cmp(&b.height()),
            SortField::UnitPrice => a.unit_price().total_cmp(&b.unit_price()),
            SortField::Area => a.area().total_cmp(&b.area()),
            SortField::TotalValue => a.total_value().total_cmp(&b.total_value()),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        }
    }
}

/// Case-insensitive first, then exact, so "sala" and "Sala" sort together.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow shown next to the active column header.
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// A sortable column header as displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub field: SortField,
    pub label: &'static str,
    /// Set on the active sort column only
    pub arrow: Option<&'static str>,
}

/// Group filter choices as `(value, label)`: all groups first, then each
/// group in creation order.
pub fn filter_options(groups: &[Group]) -> Vec<(String, String)> {
    std::iter::once((String::new(), ALL_GROUPS_LABEL.to_string()))
        .chain(groups.iter().map(|g| (g.name.clone(), g.name.clone())))
        .collect()
}

/// One visible row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    /// Position of the piece in the store
    pub index: usize,
    pub piece: &'a Piece,
}

/// Sort and filter settings of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceQuery {
    sort_field: SortField,
    direction: SortDirection,
    /// Group name to show, empty for all groups
    filter_group: String,
}

impl Default for PieceQuery {
    /// Newest first, all groups.
    fn default() -> Self {
        Self {
            sort_field: SortField::CreatedAt,
            direction: SortDirection::Descending,
            filter_group: String::new(),
        }
    }
}

impl PieceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn filter_group(&self) -> &str {
        &self.filter_group
    }

    /// Column header click: same field toggles direction, a new field
    /// starts ascending.
    pub fn sort_by(&mut self, field: SortField) {
        if self.sort_field == field {
            self.direction = self.direction.reversed();
        } else {
            self.sort_field = field;
            self.direction = SortDirection::Ascending;
        }
        log::debug!(
            "Listing sorted by {:?} {:?}",
            self.sort_field,
            self.direction
        );
    }

    /// Show only pieces of this group; an empty name shows all.
    pub fn set_filter_group(&mut self, group: impl Into<String>) {
        self.filter_group = group.into();
    }

    /// Column headers with the arrow on the active one.
    pub fn headers(&self) -> Vec<Header> {
        SortField::ALL
            .into_iter()
            .map(|field| Header {
                field,
                label: field.label(),
                arrow: self.arrow_for(field),
            })
            .collect()
    }

    /// Arrow for a column header, only on the active sort column.
    pub fn arrow_for(&self, field: SortField) -> Option<&'static str> {
        (self.sort_field == field).then(|| self.direction.arrow())
    }

    /// Visible rows in display order. Equal keys keep store order.
    pub fn apply<'a>(&self, pieces: &'a [Piece]) -> Vec<Row<'a>> {
        let mut rows: Vec<Row<'a>> = pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| self.filter_group.is_empty() || piece.group() == self.filter_group)
            .map(|(index, piece)| Row { index, piece })
            .collect();

        rows.sort_by(|a, b| {
            let ordering = self.sort_field.compare(a.piece, b.piece);
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PieceDraft;

    fn piece(id: &str, group: &str, quantity: u32, created_at: u64) -> Piece {
        Piece::new(
            id,
            PieceDraft {
                group: group.to_string(),
                quantity,
                width: 1.0,
                height: 0.5,
                unit_price: 10.0,
                ..Default::default()
            },
            created_at,
        )
    }

    fn sample() -> Vec<Piece> {
        vec![
            piece("a", "Sala", 3, 100),
            piece("b", "Cozinha", 1, 300),
            piece("c", "Sala", 2, 200),
        ]
    }

    fn ids(rows: &[Row<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.piece.id().to_string()).collect()
    }

    #[test]
    fn test_default_newest_first() {
        let pieces = sample();
        let rows = PieceQuery::default().apply(&pieces);
        assert_eq!(ids(&rows), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rows_carry_store_index() {
        let pieces = sample();
        let rows = PieceQuery::default().apply(&pieces);
        let indices: Vec<_> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 0]);
        for row in &rows {
            assert_eq!(pieces[row.index].id(), row.piece.id());
        }
    }

    #[test]
    fn test_sort_toggle() {
        let pieces = sample();
        let mut query = PieceQuery::default();

        query.sort_by(SortField::Quantity);
        assert_eq!(query.direction(), SortDirection::Ascending);
        assert_eq!(ids(&query.apply(&pieces)), vec!["b", "c", "a"]);

        query.sort_by(SortField::Quantity);
        assert_eq!(query.direction(), SortDirection::Descending);
        assert_eq!(ids(&query.apply(&pieces)), vec!["a", "c", "b"]);

        query.sort_by(SortField::CreatedAt);
        assert_eq!(query.direction(), SortDirection::Ascending);
        assert_eq!(ids(&query.apply(&pieces)), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_group_sort_is_stable() {
        let pieces = sample();
        let mut query = PieceQuery::default();
        query.sort_by(SortField::Group);
        assert_eq!(ids(&query.apply(&pieces)), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_filter_group() {
        let pieces = sample();
        let mut query = PieceQuery::default();
        query.set_filter_group("Sala");
        let rows = query.apply(&pieces);
        assert_eq!(ids(&rows), vec!["c", "a"]);

        query.set_filter_group("");
        assert_eq!(query.apply(&pieces).len(), 3);

        query.set_filter_group("Varanda");
        assert!(query.apply(&pieces).is_empty());
    }

    #[test]
    fn test_arrow_only_on_active_column() {
        let query = PieceQuery::default();
        assert_eq!(query.arrow_for(SortField::CreatedAt), Some("↓"));
        assert_eq!(query.arrow_for(SortField::Area), None);
    }

    #[test]
    fn test_headers_follow_sort() {
        let mut query = PieceQuery::default();
        query.sort_by(SortField::Area);
        let headers = query.headers();
        assert_eq!(headers.len(), SortField::ALL.len());
        assert_eq!(headers[0].label, "Espaço");
        let marked: Vec<_> = headers.iter().filter(|h| h.arrow.is_some()).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].field, SortField::Area);
        assert_eq!(marked[0].arrow, Some("↑"));
    }

    #[test]
    fn test_field_keys() {
        for field in SortField::ALL {
            assert_eq!(SortField::from_key(field.key()), Some(field));
        }
        assert_eq!(SortField::from_key("unitPrice"), Some(SortField::UnitPrice));
        assert_eq!(SortField::from_key("price"), None);
    }

    #[test]
    fn test_filter_options() {
        let groups = vec![Group::new("Sala"), Group::new("Cozinha")];
        let options = filter_options(&groups);
        assert_eq!(
            options,
            vec![
                (String::new(), ALL_GROUPS_LABEL.to_string()),
                ("Sala".to_string(), "Sala".to_string()),
                ("Cozinha".to_string(), "Cozinha".to_string()),
            ]
        );
    }
}

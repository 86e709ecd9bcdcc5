use crate::rank::SortKey;

#[derive(Debug, Clone, PartialEq)]
pub enum Direction {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    EnterFilterMode,
    ExitFilterMode,
    ClearFilter,
    UpdateFilter(String),
    SortBy(SortKey),
    CycleSortKey,
    ReverseSort,
    Export,
    Refresh,
    CycleTheme,
    ToggleHelp,
    ClickAt(u16, u16),
    None,
}

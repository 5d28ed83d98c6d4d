//! Quoridor game rules engine with a graph-based board representation.
//!
//! # Board Encoding
//!
//! ```text
//! Cells are indexed row-major on a SIZE x SIZE grid (SIZE = 9):
//!
//!    0  1  2  3  4  5  6  7  8
//!    9 10 11 12 13 14 15 16 17
//!   ..                       ..
//!   72 73 74 75 76 77 78 79 80
//!
//! The board is an undirected graph. Each cell's adjacency list holds the
//! orthogonal neighbors not separated by a fence, inserted in the fixed
//! order: up, right, down, left. Pathfinding tie-breaks follow from this
//! order, so it must never change.
//!
//! A fence is identified by the index of the top-left cell it touches plus
//! an orientation, and cuts exactly two edges (four directed half-edges):
//!
//!   Horizontal at p:  p -- p+SIZE   and  p+1 -- p+1+SIZE
//!   Vertical at p:    p -- p+1      and  p+SIZE -- p+SIZE+1
//! ```
//!
//! Player 0 starts at the middle of the first row and wins on the last row.
//! In a 2-player match player 1 starts opposite; in a 4-player match players
//! 1 and 3 start on the last and first columns and win on the opposite one.
//!
//! The engine deliberately does not validate pawn moves or fence drops at
//! the mutation boundary: callers are expected to restrict moves to the
//! perspective graph and pre-filter fences against the placement errors.
//! Contract violations are caught by `debug_assert!` in debug builds only.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Board dimension of a standard match (9x9 cells).
pub const SIZE: usize = 9;

/// Total fence count of a match, split evenly between the players.
pub const FENCES: u8 = 20;

/// Maximum number of snapshots kept on each of the undo/redo stacks.
/// Exceeding the cap silently evicts the oldest entry.
pub const MAX_HISTORY: usize = 50;

/// Fence orientation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

// ============================================================================
// BOARD GRAPH
// ============================================================================

/// Adjacency-list representation of the board.
///
/// Edges are symmetric by construction and fence cuts always remove both
/// directions, so `connected(a, b) == connected(b, a)` for every graph that
/// has not been perspective-adjusted.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BoardGraph {
    size: usize,
    edges: Vec<Vec<usize>>,
}

impl BoardGraph {
    /// Build the unmodified grid graph for a `size` x `size` board.
    pub fn new(size: usize) -> BoardGraph {
        let cells = size * size;
        let mut edges = Vec::with_capacity(cells);
        for i in 0..cells {
            let mut adjacent = Vec::with_capacity(4);
            if i >= size {
                adjacent.push(i - size); // up
            }
            if (i + 1) % size != 0 {
                adjacent.push(i + 1); // right
            }
            if i < cells - size {
                adjacent.push(i + size); // down
            }
            if i % size != 0 {
                adjacent.push(i - 1); // left
            }
            edges.push(adjacent);
        }
        BoardGraph { size, edges }
    }

    /// Board dimension.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells (`size * size`).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.edges.len()
    }

    /// Cells directly reachable from `cell`.
    #[inline]
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        &self.edges[cell]
    }

    /// Whether an edge `a -- b` exists.
    #[inline]
    pub fn connected(&self, a: usize, b: usize) -> bool {
        self.edges[a].contains(&b)
    }

    /// Remove the edge `a -- b` in both directions. Removing an absent edge
    /// or referencing an out-of-board cell is a no-op.
    fn cut(&mut self, a: usize, b: usize) {
        let cells = self.edges.len();
        if a >= cells || b >= cells {
            return;
        }
        self.edges[a].retain(|&e| e != b);
        self.edges[b].retain(|&e| e != a);
    }

    /// Return a new graph with a horizontal fence placed at `position`.
    ///
    /// The receiver is never mutated, so speculative placement during the
    /// legality scan cannot corrupt canonical state.
    pub fn with_horizontal_fence(&self, position: usize) -> BoardGraph {
        debug_assert!(position < self.cell_count());
        let mut graph = self.clone();
        graph.cut(position, position + self.size);
        graph.cut(position + 1, position + 1 + self.size);
        graph
    }

    /// Return a new graph with a vertical fence placed at `position`.
    pub fn with_vertical_fence(&self, position: usize) -> BoardGraph {
        debug_assert!(position < self.cell_count());
        let mut graph = self.clone();
        graph.cut(position, position + 1);
        graph.cut(position + self.size, position + self.size + 1);
        graph
    }
}

// ============================================================================
// PATH SEARCH
// ============================================================================

/// All cells reachable from `start`, including `start` itself.
///
/// Exploration is FIFO and the returned order is discovery order, but
/// callers must treat the result as a set.
pub fn breadth_first_search(graph: &BoardGraph, start: usize) -> Vec<usize> {
    debug_assert!(start < graph.cell_count());
    let mut explored = vec![false; graph.cell_count()];
    let mut order = Vec::with_capacity(graph.cell_count());
    let mut queue = VecDeque::new();
    explored[start] = true;
    order.push(start);
    queue.push_back(start);
    while let Some(cell) = queue.pop_front() {
        for &next in graph.neighbors(cell) {
            if !explored[next] {
                explored[next] = true;
                order.push(next);
                queue.push_back(next);
            }
        }
    }
    order
}

/// Shortest path from `start` to the nearest member of `targets`.
///
/// The path ends at the reached target and excludes `start`. Returns an
/// empty path when `start` is already a target or when no target is
/// reachable. Among targets at equal distance the one discovered first by
/// the BFS wins; this follows from the fixed neighbor-list order and is
/// deterministic.
pub fn shortest_path(graph: &BoardGraph, start: usize, targets: &[usize]) -> Vec<usize> {
    debug_assert!(start < graph.cell_count());
    if targets.contains(&start) {
        return Vec::new();
    }
    let cells = graph.cell_count();
    let mut explored = vec![false; cells];
    // Each node is assigned exactly one parent: the node that discovered it.
    let mut parent: Vec<Option<usize>> = vec![None; cells];
    let mut queue = VecDeque::new();
    explored[start] = true;
    queue.push_back(start);

    let mut reached = None;
    'search: while let Some(cell) = queue.pop_front() {
        for &next in graph.neighbors(cell) {
            if !explored[next] {
                explored[next] = true;
                parent[next] = Some(cell);
                queue.push_back(next);
                if targets.contains(&next) {
                    reached = Some(next);
                    break 'search;
                }
            }
        }
    }

    let target = match reached {
        Some(target) => target,
        None => return Vec::new(),
    };

    // Walk the parent pointers back to (but not including) the start.
    let mut path = Vec::new();
    let mut node = target;
    loop {
        path.push(node);
        match parent[node] {
            Some(from) if from != start => node = from,
            _ => break,
        }
    }
    path.reverse();
    path
}

// ============================================================================
// PERSPECTIVE GRAPH
// ============================================================================

/// Derive the adjacency list usable by the active player, encoding the
/// jump-over-opponent and diagonal-fallback rules on top of the canonical
/// graph.
///
/// - Opponent-occupied cells get empty edge lists: they can never be landed
///   on or pathed through.
/// - Every other cell adjacent to an opponent gets a recomputed list: its
///   canonical edges minus opponent cells, plus - for each adjacent
///   opponent - either the straight jump cell directly behind the opponent,
///   or, when that cell is fenced off / off the board / occupied, the
///   opponent's remaining neighbors as diagonal destinations.
/// - All other cells keep their canonical edges.
///
/// The recomputed lists may contain duplicates; callers use membership
/// semantics only.
pub fn perspective_graph(
    graph: &BoardGraph,
    player_positions: &[usize],
    active_player: usize,
) -> BoardGraph {
    debug_assert!(active_player < player_positions.len());
    let opponents: Vec<usize> = player_positions
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != active_player)
        .map(|(_, &position)| position)
        .collect();

    // Cells whose move set changes: every non-opponent cell adjacent to at
    // least one opponent.
    let mut fringe: Vec<usize> = Vec::new();
    for &opponent in &opponents {
        for &cell in graph.neighbors(opponent) {
            if !fringe.contains(&cell) && !opponents.contains(&cell) {
                fringe.push(cell);
            }
        }
    }

    let mut result = graph.clone();
    for &cell in &fringe {
        let mut edges: Vec<usize> = graph
            .neighbors(cell)
            .iter()
            .copied()
            .filter(|edge| !opponents.contains(edge))
            .collect();
        for &opponent in &opponents {
            if !graph.connected(cell, opponent) {
                continue;
            }
            // Reflect through the opponent to find the straight jump cell.
            let far = (2 * opponent) as isize - cell as isize;
            let far = if far >= 0 && (far as usize) < graph.cell_count() {
                Some(far as usize)
            } else {
                None
            };
            match far {
                Some(far_cell)
                    if graph.connected(opponent, far_cell) && !opponents.contains(&far_cell) =>
                {
                    edges.push(far_cell);
                }
                _ => {
                    // Straight jump blocked: the opponent's other neighbors
                    // become diagonal destinations.
                    for &edge in graph.neighbors(opponent) {
                        if edge != cell && Some(edge) != far && !opponents.contains(&edge) {
                            edges.push(edge);
                        }
                    }
                }
            }
        }
        result.edges[cell] = edges;
    }
    for &opponent in &opponents {
        result.edges[opponent].clear();
    }
    result
}

// ============================================================================
// FENCE LEGALITY
// ============================================================================

/// A fence placement that would strip a player of every path to their goal.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct FencePlacementError {
    /// Candidate fence position (top-left affected cell).
    pub position: usize,
    /// Orientation of the candidate fence.
    pub orientation: Orientation,
    /// Cells still reachable by the blocked player after the placement.
    pub path: Vec<usize>,
    /// The player's shortest path to goal before the placement.
    pub shortest_path: Vec<usize>,
    /// Absolute index of the player who would be blocked.
    pub player: usize,
}

/// Illegal fence placements, grouped by orientation.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct FenceErrors {
    pub horizontal: Vec<FencePlacementError>,
    pub vertical: Vec<FencePlacementError>,
}

/// Whether `reachable` contains no cell satisfying the player's winning
/// condition. The condition is structural per seat: it depends on the
/// player's absolute index and the player count, not on who is to move.
fn blocks_goal(reachable: &[usize], player: usize, player_count: usize, size: usize) -> bool {
    let cells = size * size;
    match player {
        // Seat 0 aims for the last row.
        0 => reachable.iter().all(|&cell| cell < cells - size),
        // Seat 1 aims for the first row in a 2-player match, the first
        // column in a 4-player match.
        1 if player_count == 2 => reachable.iter().all(|&cell| cell > size - 1),
        1 => reachable.iter().all(|&cell| cell % size != 0),
        // Seat 2 aims for the first row.
        2 => reachable.iter().all(|&cell| cell > size - 1),
        // Seat 3 aims for the last column.
        3 => reachable.iter().all(|&cell| cell % size != size - 1),
        _ => false,
    }
}

/// Exhaustively classify every candidate fence position and orientation,
/// flagging the ones that would leave some player with zero paths to goal.
///
/// Players are evaluated starting from the active seat and wrapping, so a
/// caller that only inspects the head of a collection still sees the active
/// player's blockers first. For each player, every cell index is simulated
/// with both orientations on a copy of the canonical graph, a BFS is run
/// from the player's position, and the reachable set is checked against
/// that player's winning condition.
///
/// Pure and idempotent: identical input yields identical output and the
/// canonical state is never touched.
pub fn fence_placement_errors(
    graph: &BoardGraph,
    player_positions: &[usize],
    active_player: usize,
    winning_positions: &[Vec<usize>],
) -> FenceErrors {
    let player_count = player_positions.len();
    let size = graph.size();
    let mut errors = FenceErrors::default();

    for seat in 0..player_count {
        let player = (seat + active_player) % player_count;
        let start = player_positions[player];
        let before = shortest_path(graph, start, &winning_positions[player]);

        for position in 0..graph.cell_count() {
            let reachable = breadth_first_search(&graph.with_horizontal_fence(position), start);
            if blocks_goal(&reachable, player, player_count, size) {
                errors.horizontal.push(FencePlacementError {
                    position,
                    orientation: Orientation::Horizontal,
                    path: reachable,
                    shortest_path: before.clone(),
                    player,
                });
            }

            let reachable = breadth_first_search(&graph.with_vertical_fence(position), start);
            if blocks_goal(&reachable, player, player_count, size) {
                errors.vertical.push(FencePlacementError {
                    position,
                    orientation: Orientation::Vertical,
                    path: reachable,
                    shortest_path: before.clone(),
                    player,
                });
            }
        }
    }
    errors
}

// ============================================================================
// MATCH STATE
// ============================================================================

/// Recorded fence placements. A position is never revoked once recorded.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct FencePositions {
    pub horizontal: Vec<usize>,
    pub vertical: Vec<usize>,
}

/// Placed fences plus each player's remaining allotment.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Fences {
    pub positions: FencePositions,
    /// Remaining fences per player, indexed by player.
    pub available: Vec<u8>,
}

/// A deep, independent snapshot of the canonical match state, excluding the
/// undo/redo stacks themselves. This is both the history entry type and the
/// read surface handed to observers on every change.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub fences: Fences,
    pub player_positions: Vec<usize>,
    pub active_player: usize,
    pub graph: BoardGraph,
    pub player_winning_positions: Vec<Vec<usize>>,
}

/// A mutation request. Dispatching commands through [`MatchState::apply`]
/// is equivalent to calling the matching method directly.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Command {
    Move { to: usize },
    PlaceHorizontalFence { position: usize },
    PlaceVerticalFence { position: usize },
    Undo,
    Redo,
    Reset { players: usize },
}

/// The derived view consumed by the input layer: which fence drops are
/// illegal, and where the active player may move.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ActivePlayerView {
    pub error: FenceErrors,
    pub graph: BoardGraph,
}

/// Canonical match state and turn machine.
///
/// All mutation happens through the methods below; every mutating action
/// first pushes a snapshot onto the bounded `history` stack and clears
/// `future`. The engine trusts callers to only request moves present in the
/// current perspective graph and fences absent from the placement errors;
/// it applies whatever it is given.
#[derive(Clone, PartialEq, Debug)]
pub struct MatchState {
    pub fences: Fences,
    pub player_positions: Vec<usize>,
    pub active_player: usize,
    pub graph: BoardGraph,
    pub player_winning_positions: Vec<Vec<usize>>,
    history: VecDeque<MatchSnapshot>,
    future: VecDeque<MatchSnapshot>,
}

/// Standard starting seats. Seat 0 is the middle of the first row; in a
/// 2-player match seat 1 mirrors it on the last row; a 4-player match adds
/// seats on the middle of the last and first columns.
fn starting_positions(players: usize) -> Vec<usize> {
    let half = SIZE / 2;
    if players == 2 {
        vec![half, SIZE * (SIZE - 1) + half]
    } else {
        vec![
            half,
            SIZE * half + SIZE - 1,
            SIZE * (SIZE - 1) + half,
            SIZE * half,
        ]
    }
}

/// Winning cell sets per seat, precomputed once per match.
fn winning_positions(players: usize) -> Vec<Vec<usize>> {
    let cells = SIZE * SIZE;
    let last_row: Vec<usize> = (0..SIZE).map(|i| cells - i - 1).collect();
    let first_row: Vec<usize> = (0..SIZE).collect();
    if players == 2 {
        vec![last_row, first_row]
    } else {
        let first_column: Vec<usize> = (0..SIZE).map(|i| i * SIZE).collect();
        let last_column: Vec<usize> = (0..SIZE).map(|i| i * SIZE + SIZE - 1).collect();
        vec![last_row, first_column, first_row, last_column]
    }
}

impl MatchState {
    /// Fresh default state for a 2- or 4-player match: no fences placed,
    /// full allotments, standard seats, empty history.
    pub fn new(players: usize) -> MatchState {
        debug_assert!(players == 2 || players == 4);
        MatchState {
            fences: Fences {
                positions: FencePositions::default(),
                available: vec![FENCES / players as u8; players],
            },
            player_positions: starting_positions(players),
            active_player: 0,
            graph: BoardGraph::new(SIZE),
            player_winning_positions: winning_positions(players),
            history: VecDeque::new(),
            future: VecDeque::new(),
        }
    }

    /// Number of players in the match.
    #[inline]
    pub fn player_count(&self) -> usize {
        self.player_positions.len()
    }

    /// Deep copy of the canonical state, excluding history/future.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            fences: self.fences.clone(),
            player_positions: self.player_positions.clone(),
            active_player: self.active_player,
            graph: self.graph.clone(),
            player_winning_positions: self.player_winning_positions.clone(),
        }
    }

    fn restore(&mut self, snapshot: MatchSnapshot) {
        self.fences = snapshot.fences;
        self.player_positions = snapshot.player_positions;
        self.active_player = snapshot.active_player;
        self.graph = snapshot.graph;
        self.player_winning_positions = snapshot.player_winning_positions;
    }

    /// Push a pre-mutation snapshot and invalidate the redo stack. Called
    /// at the top of every mutating action.
    fn record_history(&mut self) {
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(self.snapshot());
        self.future.clear();
    }

    #[inline]
    fn advance_turn(&mut self) {
        self.active_player = (self.active_player + 1) % self.player_count();
    }

    /// Move the active player to `new_position` and advance the turn.
    ///
    /// The engine does not re-derive move legality here: `new_position`
    /// must come from the current perspective graph (caller contract).
    pub fn move_to(&mut self, new_position: usize) {
        debug_assert!(new_position < self.graph.cell_count());
        self.record_history();
        let active = self.active_player;
        self.player_positions[active] = new_position;
        self.advance_turn();
    }

    /// Place a horizontal fence at `position`: record it, spend one of the
    /// active player's fences, recompute the canonical graph and advance
    /// the turn. Applied unconditionally (caller contract, see
    /// [`fence_placement_errors`]).
    pub fn place_horizontal_fence(&mut self, position: usize) {
        debug_assert!(position < self.graph.cell_count());
        self.record_history();
        self.fences.positions.horizontal.push(position);
        self.spend_fence();
        self.graph = self.graph.with_horizontal_fence(position);
        self.advance_turn();
    }

    /// Place a vertical fence at `position`. Same bookkeeping as
    /// [`MatchState::place_horizontal_fence`].
    pub fn place_vertical_fence(&mut self, position: usize) {
        debug_assert!(position < self.graph.cell_count());
        self.record_history();
        self.fences.positions.vertical.push(position);
        self.spend_fence();
        self.graph = self.graph.with_vertical_fence(position);
        self.advance_turn();
    }

    fn spend_fence(&mut self) {
        let active = self.active_player;
        debug_assert!(self.fences.available[active] > 0);
        self.fences.available[active] = self.fences.available[active].saturating_sub(1);
    }

    /// Revert the most recent mutation. Returns `false` (and leaves the
    /// state untouched) when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let snapshot = match self.history.pop_back() {
            Some(snapshot) => snapshot,
            None => return false,
        };
        if self.future.len() == MAX_HISTORY {
            self.future.pop_front();
        }
        self.future.push_back(self.snapshot());
        self.restore(snapshot);
        true
    }

    /// Re-apply the most recently undone mutation. Returns `false` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let snapshot = match self.future.pop_back() {
            Some(snapshot) => snapshot,
            None => return false,
        };
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(self.snapshot());
        self.restore(snapshot);
        true
    }

    /// Replace the match wholesale with a fresh default state.
    pub fn reset(&mut self, players: usize) {
        *self = MatchState::new(players);
    }

    /// Dispatch a [`Command`] to the matching mutator.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Move { to } => self.move_to(to),
            Command::PlaceHorizontalFence { position } => self.place_horizontal_fence(position),
            Command::PlaceVerticalFence { position } => self.place_vertical_fence(position),
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Reset { players } => self.reset(players),
        }
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Derived winner: the 1-based number of a player standing on one of
    /// their winning cells, or `None`.
    ///
    /// This is a read, not a terminal transition: the engine never blocks
    /// further mutation after a win. When several players simultaneously
    /// occupy winning cells (not reachable under correct move legality)
    /// the highest player index wins the tie.
    pub fn winner(&self) -> Option<u8> {
        let mut winner = None;
        for (player, &position) in self.player_positions.iter().enumerate() {
            if self.player_winning_positions[player].contains(&position) {
                winner = Some(player as u8 + 1);
            }
        }
        winner
    }

    /// Recompute the active player's derived view from scratch: fence
    /// placement errors plus the perspective graph. This is the
    /// authoritative legality source consumed by the input layer.
    pub fn active_player_view(&self) -> ActivePlayerView {
        ActivePlayerView {
            error: fence_placement_errors(
                &self.graph,
                &self.player_positions,
                self.active_player,
                &self.player_winning_positions,
            ),
            graph: perspective_graph(&self.graph, &self.player_positions, self.active_player),
        }
    }
}

impl Default for MatchState {
    /// A 4-player match, matching the original application default.
    fn default() -> Self {
        Self::new(4)
    }
}

// ============================================================================
// TESTS
// ============================================================================

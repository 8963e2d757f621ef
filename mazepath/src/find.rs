use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    fmt::Debug,
    hash::Hash,
    ops::{Deref, DerefMut},
};

use log::{debug, info, warn};

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable, hashable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + Hash + Debug + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// The type that the map uses for storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Check if the provided node reference can be occupied
    fn is_valid(&self, node: Self::Reference) -> bool;

    /// Return an iterator over the neighbors of the provided node and the cost required to go there
    fn neighbors_of(&self, node: Self::Reference)
        -> impl Iterator<Item = (Self::Reference, usize)>;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

/// Describes where the search should end.
///
/// `estimate` must never overestimate the remaining cost to the nearest node
/// for which `is_reached` holds, and must not drop by more than the move cost
/// between two neighbors.
pub trait Goal<R> {
    fn is_reached(&self, node: R) -> bool;
    fn estimate(&self, node: R) -> usize;
}

/// The objects that we store in the priority queue
#[derive(Debug)]
struct ToVisit<R> {
    f: usize,
    g: usize,
    sequence: u64,
    point: R,
}

impl<R> Ord for ToVisit<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        // lowest f, then lowest g, then first pushed
        self.f
            .cmp(&other.f)
            .then(self.g.cmp(&other.g))
            .then(self.sequence.cmp(&other.sequence))
            .reverse() // reverse for BinaryHeap to be a min-heap
    }
}

impl<R> PartialOrd for ToVisit<R> {
    fn partial_cmp(&self, other: &ToVisit<R>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> PartialEq for ToVisit<R> {
    fn eq(&self, other: &ToVisit<R>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R> Eq for ToVisit<R> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisitedItem<R> {
    /// lowest cost from the start discovered so far
    pub cost: usize,
    pub from: Option<R>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visited<R>(Option<VisitedItem<R>>);

impl<R> Default for Visited<R> {
    fn default() -> Self {
        Visited(None)
    }
}
impl<R> Deref for Visited<R> {
    type Target = Option<VisitedItem<R>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<R> DerefMut for Visited<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    pub path: Vec<R>,
    pub start: R,
    /// the node that satisfied the goal test, also the last entry of `path`
    pub goal: R,
    pub total_cost: usize,
    pub expanded: usize,
}

impl<R> PathResult<R> {
    /// Number of moves along the path
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    NoPathFound,
    PathFound(PathResult<R>),
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }

    pub fn into_path(self) -> Option<PathResult<R>> {
        match self {
            PathFinderState::PathFound(result) => Some(result),
            _ => None,
        }
    }
}

/// Best-first (A*) search over any [`MapTrait`].
///
/// The frontier may hold several entries for the same node; entries whose
/// cost is above the best known cost for their node are dropped when popped.
#[derive(Debug)]
pub struct PathFinder<
    R: NodeReference,
    G: Goal<R>,
    S: MapStorage<Visited<R>, Reference = R>,
    M: MapTrait<Reference = R, Storage<Visited<R>> = S>,
> {
    start: R,
    goal: G,
    visited: S,
    visit_list: BinaryHeap<ToVisit<R>>,
    sequence: u64,
    expanded: usize,
    state: PathFinderState<R>,
    _map: std::marker::PhantomData<M>,
}

impl<
        R: NodeReference,
        G: Goal<R>,
        S: MapStorage<Visited<R>, Reference = R>,
        M: MapTrait<Reference = R, Storage<Visited<R>> = S>,
    > PathFinder<R, G, S, M>
{
    pub fn new(start: R, goal: G, mut visited: S) -> Self {
        *visited.get_mut(start) = Visited(Some(VisitedItem {
            cost: 0,
            from: None,
        }));

        Self {
            start,
            visit_list: BinaryHeap::from([ToVisit {
                f: goal.estimate(start),
                g: 0,
                sequence: 0,
                point: start,
            }]),
            goal,
            visited,
            sequence: 1,
            expanded: 0,
            state: PathFinderState::Computing,
            _map: std::marker::PhantomData,
        }
    }

    pub fn finish(mut self, map: &M) -> (PathFinderState<R>, S) {
        debug!("searching from {:?}", self.start);
        loop {
            match self.step(map) {
                PathFinderState::Computing => {}
                s => {
                    match &s {
                        PathFinderState::PathFound(result) => info!(
                            "path found: {} steps, {} nodes expanded",
                            result.steps(),
                            result.expanded
                        ),
                        _ => warn!(
                            "no path from {:?} after expanding {} nodes",
                            self.start, self.expanded
                        ),
                    }
                    return (s, self.visited);
                }
            }
        }
    }

    pub fn step(&mut self, map: &M) -> PathFinderState<R> {
        if self.state.is_done() {
            return self.state.clone();
        }

        let Some(visit) = self.visit_list.pop() else {
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };

        // skip entries that were superseded by a cheaper route
        match *self.visited.get(visit.point) {
            Some(item) if item.cost < visit.g => return self.state.clone(),
            _ => {}
        }

        self.expanded += 1;

        if self.goal.is_reached(visit.point) {
            self.state = PathFinderState::PathFound(PathResult {
                path: self.backtrack(visit.point),
                start: self.start,
                goal: visit.point,
                total_cost: visit.g,
                expanded: self.expanded,
            });
            return self.state.clone();
        }

        for (point, move_cost) in map.neighbors_of(visit.point) {
            let g = visit.g + move_cost;

            let improves = match *self.visited.get(point) {
                Some(item) => g < item.cost,
                None => true,
            };
            if !improves {
                continue;
            }

            *self.visited.get_mut(point) = Visited(Some(VisitedItem {
                cost: g,
                from: Some(visit.point),
            }));
            self.visit_list.push(ToVisit {
                f: g + self.goal.estimate(point),
                g,
                sequence: self.sequence,
                point,
            });
            self.sequence += 1;
        }

        self.state.clone()
    }

    /// Follow the parent links from `end` back to the start
    fn backtrack(&self, end: R) -> Vec<R> {
        let mut path: Vec<R> = vec![end];
        let mut previous_visit = self.visited.get(end);

        loop {
            previous_visit = match previous_visit {
                Visited(Some(VisitedItem { from: None, .. })) => {
                    // we found the starting point, we are done
                    break;
                }
                Visited(Some(VisitedItem {
                    from: Some(from), ..
                })) => {
                    path.push(from);
                    self.visited.get(from)
                }
                Visited(None) => {
                    unreachable!("backtracking lead to a point that was never visited")
                }
            }
        }

        path.reverse();
        path
    }

    pub fn state(&self) -> &PathFinderState<R> {
        &self.state
    }

    /// Number of frontier entries, stale ones included
    pub fn frontier_len(&self) -> usize {
        self.visit_list.len()
    }
}

/// Run a search to completion with fresh tables.
pub fn find_path<R, G, M>(map: &M, start: R, goal: G) -> PathFinderState<R>
where
    R: NodeReference,
    G: Goal<R>,
    M: MapTrait<Reference = R>,
{
    PathFinder::<R, G, M::Storage<Visited<R>>, M>::new(start, goal, map.create_storage())
        .finish(map)
        .0
}

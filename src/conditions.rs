// Window parameters
pub const CELL_PIXELS: usize = 4; // Size of a cell on screen (in pixel), both axes
pub const DENSITY_DISPLAY_MAX: f32 = 40.0; // Projected density mapped to full intensity



// Grid parameters
pub const N: usize = 128; // Cells per axis, the grid is always a cube
pub const STAGGER: f32 = 0.5; // Cell centers sit half a cell away from the corners
pub const CLAMP_MARGIN: f32 = 1e-4; // Keeps the upper interpolation neighbour inside the grid



// Physical parameters
pub const DT: f32 = 0.1;



// Solver parameters
pub const JACOBI_ITERATIONS: usize = 20; // Fixed budget, no convergence check
pub const JACOBI_A: f32 = 1.0; // Neighbour weight of the Poisson stencil
pub const JACOBI_C: f32 = 6.0; // Diagonal of the Poisson stencil (uniform 3D grid)



// Source parameters
pub const SOURCE_SIZE: usize = 20; // Side of the density cube, centered in x/z
pub const SOURCE_RATE: f32 = 100.0; // Density added per unit time inside the cube
pub const IMPULSE_PROBABILITY: f64 = 0.1; // Chance for a cell to get a random kick each step
pub const IMPULSE_MIN: [f32; 3] = [-1.0, -0.5, -1.0];
pub const IMPULSE_MAX: [f32; 3] = [1.0, 1.5, 1.0]; // Upward bias on y

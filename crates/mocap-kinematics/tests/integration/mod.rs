mod fixtures;
mod interpolation;
mod kinematics;

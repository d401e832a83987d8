mod configmap;
mod deployment;
mod values;
